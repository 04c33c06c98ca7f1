use chrono::NaiveDate;
use rust_decimal_macros::dec;
use servicelines::core::*;
use tracing_subscriber::EnvFilter;

fn main() {
    // RUST_LOG=servicelines=trace shows every cache hit.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("servicelines=debug")),
        )
        .init();

    let store = MemoryStore::new()
        .with(
            ServiceLineBuilder::new("abcdef1234", "Fiber 500")
                .address("Friedrichstraße 123, 10117 Berlin")
                .build(),
        )
        .with(
            ServiceLineBuilder::new("fedcba4321", "DSL 100")
                .address("Marienplatz 1, 80331 München")
                .status(ServiceLineStatus::Suspended)
                .build(),
        );

    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let invoice = |id: &str, service_line: Option<&str>| {
        let mut subscription = Subscription::new(format!("SUB-{id}"));
        if let Some(line) = service_line {
            subscription = subscription.with_service_line(line);
        }
        InvoiceBuilder::new(id, date)
            .add_item(
                InvoiceItemBuilder::new("1", "Monthly fee", dec!(1), dec!(49.90))
                    .kind(ItemKind::Recurring)
                    .subscription(subscription)
                    .build(),
            )
            .add_item(
                InvoiceItemBuilder::new("2", "Traffic (GB)", dec!(120), dec!(0.05))
                    .kind(ItemKind::Usage)
                    .build(),
            )
            .build()
    };

    let batch = vec![
        invoice("INV-2024-001", Some("abcdef1234")),
        invoice("INV-2024-002", Some("abcdef1234")),
        invoice("INV-2024-003", Some("fedcba4321")),
        invoice("INV-2024-004", None),
        invoice("INV-2024-005", Some("unknown-line")),
    ];

    let attacher = ServiceLineAttacher::new(&store).on_missing(MissingServiceLine::Skip);
    let (invoices, stats) = match attacher.attach_with_stats(batch) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Enrichment failed: {e}");
            std::process::exit(1);
        }
    };

    println!("=== Enriched batch ===\n");
    for invoice in &invoices {
        println!("{} (total {} {})", invoice.id, invoice.total(), invoice.currency_code);
        for item in &invoice.items {
            match &item.service_line {
                Some(line) => println!(
                    "  {} {:<14} -> {} [{:?}] {}",
                    item.id,
                    item.description,
                    line.name,
                    line.status,
                    line.address.as_deref().unwrap_or("-")
                ),
                None => println!("  {} {:<14} -> (no service line)", item.id, item.description),
            }
        }
    }

    println!(
        "\n{} items enriched, {} missing, {} store lookups",
        stats.items_enriched,
        stats.items_missing,
        store.lookups()
    );
}

use std::cell::Cell;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use servicelines::core::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn store() -> MemoryStore {
    MemoryStore::new()
        .with(
            ServiceLineBuilder::new("abcdef1234", "Fiber 500")
                .address("Friedrichstraße 123, Berlin")
                .build(),
        )
        .with(ServiceLineBuilder::new("fedcba4321", "DSL 100").build())
}

fn invoice_with(id: &str, subscription: Option<Subscription>) -> Invoice {
    let mut item = InvoiceItemBuilder::new("1", "Monthly fee", dec!(1), dec!(49.90))
        .kind(ItemKind::Recurring);
    if let Some(subscription) = subscription {
        item = item.subscription(subscription);
    }
    InvoiceBuilder::new(id, date(2024, 6, 1))
        .add_item(item.build())
        .build()
}

fn subscribed(id: &str, service_line: &str) -> Invoice {
    invoice_with(
        id,
        Some(Subscription::new(format!("SUB-{id}")).with_service_line(service_line)),
    )
}

/// Invoices 0 and 1 share a service line, invoice 2's subscription has none.
fn scenario_a() -> Vec<Invoice> {
    vec![
        subscribed("INV-0", "abcdef1234"),
        subscribed("INV-1", "abcdef1234"),
        invoice_with("INV-2", Some(Subscription::new("SUB-INV-2"))),
    ]
}

fn attached_ids(invoices: &[Invoice]) -> Vec<Option<String>> {
    invoices
        .iter()
        .flat_map(|inv| &inv.items)
        .map(|item| item.service_line.as_ref().map(|l| l.id.to_string()))
        .collect()
}

// --- Scenario A ---

#[test]
fn shared_service_line_is_loaded_once() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);

    let invoices = attacher.attach(scenario_a()).unwrap();

    for invoice in &invoices[0..2] {
        for item in &invoice.items {
            let line = item.service_line.as_ref().expect("service line attached");
            assert_eq!(line.id.as_str(), "abcdef1234");
            assert_eq!(line.name, "Fiber 500");
        }
    }
    for item in &invoices[2].items {
        assert!(item.service_line.is_none());
    }
    assert_eq!(store.lookups(), 1);
}

#[test]
fn shared_service_line_is_the_same_allocation() {
    let store = store();
    let invoices = ServiceLineAttacher::new(&store)
        .attach(scenario_a())
        .unwrap();

    let first = invoices[0].items[0].service_line.as_ref().unwrap();
    let second = invoices[1].items[0].service_line.as_ref().unwrap();
    assert!(Arc::ptr_eq(first, second));
}

#[test]
fn preserves_input_order() {
    let store = store();
    let invoices = ServiceLineAttacher::new(&store)
        .attach(scenario_a())
        .unwrap();

    let ids: Vec<_> = invoices.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["INV-0", "INV-1", "INV-2"]);
}

#[test]
fn enriched_batch_snapshot() {
    let store = store();
    let invoices = ServiceLineAttacher::new(&store)
        .attach(scenario_a())
        .unwrap();

    let summary: Vec<(String, Option<String>)> = invoices
        .iter()
        .flat_map(|inv| {
            inv.items.iter().map(move |item| {
                (
                    format!("{}/{}", inv.id, item.id),
                    item.service_line.as_ref().map(|l| l.id.to_string()),
                )
            })
        })
        .collect();

    insta::assert_debug_snapshot!(summary, @r#"
    [
        (
            "INV-0/1",
            Some(
                "abcdef1234",
            ),
        ),
        (
            "INV-1/1",
            Some(
                "abcdef1234",
            ),
        ),
        (
            "INV-2/1",
            None,
        ),
    ]
    "#);
}

// --- Scenario B ---

#[test]
fn subscription_without_service_line_is_left_alone() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);

    let invoice = attacher
        .attach_one(invoice_with("INV-B", Some(Subscription::new("SUB-B"))))
        .unwrap();

    assert!(invoice.items[0].service_line.is_none());
    assert_eq!(store.lookups(), 0);
}

#[test]
fn empty_service_line_id_is_left_alone() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);

    let invoice = attacher
        .attach_one(invoice_with(
            "INV-B",
            Some(Subscription::new("SUB-B").with_service_line("")),
        ))
        .unwrap();

    assert!(invoice.items[0].service_line.is_none());
    assert_eq!(store.lookups(), 0);
}

#[test]
fn whitespace_service_line_id_is_resolved() {
    let store = MemoryStore::new().with(ServiceLineBuilder::new(" ", "Legacy line").build());
    let attacher = ServiceLineAttacher::new(&store);

    let invoice = attacher
        .attach_one(invoice_with(
            "INV-W",
            Some(Subscription::new("SUB-W").with_service_line(" ")),
        ))
        .unwrap();

    assert_eq!(
        invoice.items[0].service_line.as_ref().map(|l| l.id.as_str()),
        Some(" ")
    );
    assert_eq!(store.lookups(), 1);
}

#[test]
fn item_without_subscription_is_left_alone() {
    let store = store();
    let invoice = ServiceLineAttacher::new(&store)
        .attach_one(invoice_with("INV-B", None))
        .unwrap();

    assert!(invoice.items[0].service_line.is_none());
    assert_eq!(store.lookups(), 0);
}

// --- Scenario C ---

#[test]
fn not_found_fails_the_batch_by_default() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);

    let err = attacher
        .attach(vec![subscribed("INV-0", "abcdef1234"), subscribed("INV-1", "zzz")])
        .unwrap_err();

    assert_eq!(
        err,
        EnrichError::NotFound {
            id: ServiceLineId::new("zzz")
        }
    );
    assert_eq!(err.to_string(), "service line not found: zzz");
}

#[test]
fn not_found_is_retried_within_the_same_batch() {
    let store = store();
    let mut cache = ServiceLineCache::new(&store);
    let zzz = ServiceLineId::new("zzz");

    assert!(matches!(
        cache.resolve(&zzz),
        Err(EnrichError::NotFound { .. })
    ));
    assert!(!cache.contains(&zzz));
    assert!(cache.resolve(&zzz).is_err());

    assert_eq!(store.lookups_for(&zzz), 2);
}

#[test]
fn not_found_can_be_skipped() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store).on_missing(MissingServiceLine::Skip);

    let invoices = attacher
        .attach(vec![
            subscribed("INV-0", "zzz"),
            subscribed("INV-1", "zzz"),
            subscribed("INV-2", "fedcba4321"),
        ])
        .unwrap();

    assert_eq!(
        attached_ids(&invoices),
        [None, None, Some("fedcba4321".to_string())]
    );
    // Missing identifiers are not cached, so each item asks again.
    assert_eq!(store.lookups_for(&ServiceLineId::new("zzz")), 2);
}

#[test]
fn load_errors_surface_to_the_caller() {
    let mut store = store();
    store.mark_unavailable("abcdef1234");
    let attacher = ServiceLineAttacher::new(&store);

    let err = attacher.attach(scenario_a()).unwrap_err();
    match err {
        EnrichError::Load { id, reason } => {
            assert_eq!(id.as_str(), "abcdef1234");
            assert!(reason.contains("unavailable"));
        }
        other => panic!("expected load error, got {other:?}"),
    }
    // No automatic retry.
    assert_eq!(store.lookups(), 1);
}

// --- Scoping ---

#[test]
fn independent_calls_do_not_share_a_cache() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);

    attacher.attach(vec![subscribed("INV-0", "abcdef1234")]).unwrap();
    attacher
        .attach(vec![
            subscribed("INV-1", "abcdef1234"),
            subscribed("INV-2", "fedcba4321"),
        ])
        .unwrap();

    assert_eq!(store.lookups_for(&ServiceLineId::new("abcdef1234")), 2);
    assert_eq!(store.lookups_for(&ServiceLineId::new("fedcba4321")), 1);
}

#[test]
fn single_invoice_calls_have_their_own_scope() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);

    let a = attacher.attach_one(subscribed("INV-0", "abcdef1234")).unwrap();
    let b = attacher.attach_one(subscribed("INV-1", "abcdef1234")).unwrap();

    assert_eq!(store.lookups(), 2);
    assert!(!Arc::ptr_eq(
        a.items[0].service_line.as_ref().unwrap(),
        b.items[0].service_line.as_ref().unwrap()
    ));
}

#[test]
fn recovered_store_is_picked_up_by_the_next_call() {
    let mut store = store();
    store.mark_unavailable("abcdef1234");
    assert!(
        ServiceLineAttacher::new(&store)
            .attach(vec![subscribed("INV-0", "abcdef1234")])
            .is_err()
    );

    store.restore(&ServiceLineId::new("abcdef1234"));
    let invoices = ServiceLineAttacher::new(&store)
        .attach(vec![subscribed("INV-0", "abcdef1234")])
        .unwrap();
    assert_eq!(attached_ids(&invoices), [Some("abcdef1234".to_string())]);
}

// --- Idempotence ---

#[test]
fn reattaching_yields_the_same_service_lines() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);

    let once = attacher.attach(scenario_a()).unwrap();
    let before = attached_ids(&once);
    let twice = attacher.attach(once).unwrap();

    assert_eq!(attached_ids(&twice), before);
    // Fresh scope, so the shared identifier is loaded again.
    assert_eq!(store.lookups(), 2);
}

#[test]
fn reattaching_in_the_same_scope_does_not_reload() {
    let store = store();
    let attacher = ServiceLineAttacher::new(&store);
    let mut invoices = scenario_a();
    let mut cache = ServiceLineCache::new(attacher.store());

    attacher.attach_in(&mut invoices, &mut cache).unwrap();
    let before = attached_ids(&invoices);
    attacher.attach_in(&mut invoices, &mut cache).unwrap();
    cache.reset();

    assert_eq!(attached_ids(&invoices), before);
    assert_eq!(store.lookups(), 1);
}

// --- Store substitution ---

#[test]
fn closure_store_can_replace_the_backend() {
    let calls = Cell::new(0);
    let store = store_fn(|id: &ServiceLineId| {
        calls.set(calls.get() + 1);
        Ok(ServiceLineBuilder::new(id.clone(), format!("Line {id}"))
            .status(ServiceLineStatus::Suspended)
            .build())
    });

    let invoices = ServiceLineAttacher::new(store)
        .attach(vec![
            subscribed("INV-0", "x"),
            subscribed("INV-1", "y"),
            subscribed("INV-2", "x"),
        ])
        .unwrap();

    assert_eq!(calls.get(), 2);
    let line = invoices[2].items[0].service_line.as_ref().unwrap();
    assert_eq!(line.name, "Line x");
    assert_eq!(line.status, ServiceLineStatus::Suspended);
}

#[test]
fn boxed_store_works_behind_a_trait_object() {
    let store: Box<dyn ServiceLineStore> = Box::new(store());
    let invoices = ServiceLineAttacher::new(store)
        .attach(scenario_a())
        .unwrap();
    assert_eq!(
        attached_ids(&invoices),
        [
            Some("abcdef1234".to_string()),
            Some("abcdef1234".to_string()),
            None
        ]
    );
}

// --- Classification ---

#[test]
fn items_are_classified_by_kind() {
    let invoice = InvoiceBuilder::new("INV-K", date(2024, 6, 1))
        .add_item(
            InvoiceItemBuilder::new("1", "Fiber 500", dec!(1), dec!(49.90))
                .kind(ItemKind::Recurring)
                .build(),
        )
        .add_item(InvoiceItemBuilder::new("2", "Installation", dec!(1), dec!(99)).build())
        .add_item(
            InvoiceItemBuilder::new("3", "Traffic", dec!(12.5), dec!(0.08))
                .kind(ItemKind::Usage)
                .build(),
        )
        .build();

    assert_eq!(invoice.recurring_items()[0].id, "1");
    assert_eq!(invoice.non_recurring_items()[0].id, "2");
    assert_eq!(invoice.usage_items()[0].id, "3");
    assert_eq!(invoice.total(), dec!(149.90));
}

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::*;

/// Builder for constructing invoices in code.
///
/// ```
/// use servicelines::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV-2024-001", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
///     .add_item(InvoiceItemBuilder::new("1", "Fiber 500", dec!(1), dec!(49.90))
///         .kind(ItemKind::Recurring)
///         .subscription(Subscription::new("SUB-1").with_service_line("abcdef1234"))
///         .build())
///     .build();
///
/// assert_eq!(invoice.recurring_items().len(), 1);
/// assert!(invoice.items[0].service_line.is_none());
/// ```
pub struct InvoiceBuilder {
    id: String,
    issue_date: NaiveDate,
    currency_code: String,
    items: Vec<InvoiceItem>,
}

impl InvoiceBuilder {
    pub fn new(id: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            issue_date,
            currency_code: "EUR".to_string(),
            items: Vec::new(),
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn add_item(mut self, item: InvoiceItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn build(self) -> Invoice {
        Invoice {
            id: self.id,
            issue_date: self.issue_date,
            currency_code: self.currency_code,
            items: self.items,
        }
    }
}

/// Builder for a single invoice item. Items always start without a service line.
pub struct InvoiceItemBuilder {
    id: String,
    description: String,
    kind: ItemKind,
    quantity: Decimal,
    unit_price: Decimal,
    subscription: Option<Subscription>,
}

impl InvoiceItemBuilder {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            kind: ItemKind::default(),
            quantity,
            unit_price,
            subscription: None,
        }
    }

    pub fn kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    pub fn build(self) -> InvoiceItem {
        InvoiceItem {
            id: self.id,
            description: self.description,
            kind: self.kind,
            quantity: self.quantity,
            unit_price: self.unit_price,
            subscription: self.subscription,
            service_line: None,
        }
    }
}

/// Builder for service line records, mostly useful for stores and tests.
pub struct ServiceLineBuilder {
    id: ServiceLineId,
    name: String,
    address: Option<String>,
    status: ServiceLineStatus,
}

impl ServiceLineBuilder {
    pub fn new(id: impl Into<ServiceLineId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            status: ServiceLineStatus::Active,
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn status(mut self, status: ServiceLineStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> ServiceLine {
        ServiceLine {
            id: self.id,
            name: self.name,
            address: self.address,
            status: self.status,
        }
    }
}

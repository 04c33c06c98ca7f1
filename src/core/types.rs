use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a service line in the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceLineId(String);

impl ServiceLineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty identifier. Any other value, whitespace included,
    /// is an opaque key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ServiceLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceLineId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ServiceLineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A fully loaded service line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    /// Unique identifier in the store.
    pub id: ServiceLineId,
    /// Display name (e.g. "Fiber 500 / Main office").
    pub name: String,
    /// Installation address, if the line is bound to one.
    pub address: Option<String>,
    /// Provisioning status.
    pub status: ServiceLineStatus,
}

/// Provisioning status of a service line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLineStatus {
    #[default]
    Active,
    Suspended,
    Disconnected,
}

/// Subscription an invoice item was billed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    /// Service line the subscription is provisioned on.
    #[serde(default)]
    pub service_line_id: Option<ServiceLineId>,
}

impl Subscription {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            service_line_id: None,
        }
    }

    pub fn with_service_line(mut self, id: impl Into<ServiceLineId>) -> Self {
        self.service_line_id = Some(id.into());
        self
    }

    /// The service line identifier, unless it is missing or empty.
    pub fn resolvable_id(&self) -> Option<&ServiceLineId> {
        self.service_line_id.as_ref().filter(|id| !id.is_empty())
    }
}

/// How an invoice item is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Periodic subscription fee.
    Recurring,
    /// One-off charge (installation, hardware, ...).
    #[default]
    NonRecurring,
    /// Metered consumption.
    Usage,
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub kind: ItemKind,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub subscription: Option<Subscription>,
    /// Attached by [`ServiceLineAttacher`](super::ServiceLineAttacher); never read from raw data.
    #[serde(default, skip_deserializing)]
    pub service_line: Option<Arc<ServiceLine>>,
}

impl InvoiceItem {
    /// Identifier the attacher would resolve for this item.
    pub fn service_line_id(&self) -> Option<&ServiceLineId> {
        self.subscription.as_ref()?.resolvable_id()
    }

    /// quantity * unit_price, rounded to 2 places.
    pub fn line_amount(&self) -> Decimal {
        (self.quantity * self.unit_price).round_dp(2)
    }

    pub fn is_recurring(&self) -> bool {
        self.kind == ItemKind::Recurring
    }

    pub fn is_non_recurring(&self) -> bool {
        self.kind == ItemKind::NonRecurring
    }

    pub fn is_usage(&self) -> bool {
        self.kind == ItemKind::Usage
    }
}

/// An invoice with its ordered items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub issue_date: NaiveDate,
    /// ISO 4217 currency code.
    #[serde(default = "default_currency")]
    pub currency_code: String,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Invoice {
    pub fn recurring_items(&self) -> Vec<&InvoiceItem> {
        self.items.iter().filter(|i| i.is_recurring()).collect()
    }

    pub fn non_recurring_items(&self) -> Vec<&InvoiceItem> {
        self.items.iter().filter(|i| i.is_non_recurring()).collect()
    }

    pub fn usage_items(&self) -> Vec<&InvoiceItem> {
        self.items.iter().filter(|i| i.is_usage()).collect()
    }

    /// Sum of all line amounts.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(InvoiceItem::line_amount).sum()
    }
}

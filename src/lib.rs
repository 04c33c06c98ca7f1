//! # servicelines
//!
//! Enriches batches of invoices with the service lines their subscriptions
//! are provisioned on.
//!
//! Invoice items may reference a subscription, and a subscription may carry
//! the identifier of a service line held in an external store. The
//! [`ServiceLineAttacher`](core::ServiceLineAttacher) resolves those
//! identifiers and attaches the loaded records to the items. Each batch gets
//! its own [`ServiceLineCache`](core::ServiceLineCache), so an identifier shared
//! by many items is loaded once per batch and never leaks into the next one.
//!
//! All monetary values use [`rust_decimal::Decimal`].
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use servicelines::core::*;
//! use rust_decimal_macros::dec;
//!
//! let store = MemoryStore::new()
//!     .with(ServiceLineBuilder::new("abcdef1234", "Fiber 500").address("Hauptstr. 1").build());
//!
//! let invoice = InvoiceBuilder::new("INV-2024-001", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
//!     .add_item(InvoiceItemBuilder::new("1", "Fiber 500", dec!(1), dec!(49.90))
//!         .kind(ItemKind::Recurring)
//!         .subscription(Subscription::new("SUB-1").with_service_line("abcdef1234"))
//!         .build())
//!     .add_item(InvoiceItemBuilder::new("2", "Installation", dec!(1), dec!(99)).build())
//!     .build();
//!
//! let attacher = ServiceLineAttacher::new(&store);
//! let invoices = attacher.attach(vec![invoice]).unwrap();
//!
//! assert_eq!(invoices[0].items[0].service_line.as_ref().unwrap().name, "Fiber 500");
//! assert!(invoices[0].items[1].service_line.is_none());
//! assert_eq!(invoices[0].total(), dec!(148.90));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice types, service line store, cache and attacher |
//! | `json` | Build enriched collections from raw JSON invoice data |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "json")]
pub mod json;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

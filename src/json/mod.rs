//! Building enriched invoice collections from raw JSON data.
//!
//! The input is a JSON array of invoices in the shape of
//! [`Invoice`](crate::core::Invoice). Any `service_line` present in the raw
//! data is ignored; service lines only come from the store.
//!
//! # Example
//!
//! ```
//! use servicelines::core::*;
//! use servicelines::json::new_collection;
//!
//! let store = MemoryStore::new().with(ServiceLineBuilder::new("abcdef1234", "Fiber 500").build());
//! let attacher = ServiceLineAttacher::new(&store);
//!
//! let data = r#"[{
//!     "id": "INV-1",
//!     "issue_date": "2024-06-01",
//!     "items": [{
//!         "id": "1",
//!         "description": "Fiber 500",
//!         "kind": "recurring",
//!         "quantity": "1",
//!         "unit_price": "49.90",
//!         "subscription": { "id": "SUB-1", "service_line_id": "abcdef1234" }
//!     }]
//! }]"#;
//!
//! let invoices = new_collection(data, &attacher).unwrap();
//! assert_eq!(invoices[0].items[0].service_line.as_ref().unwrap().name, "Fiber 500");
//! ```

mod collection;

pub use collection::{new_collection, parse_invoices};

//! Core invoice types, the service line store seam and the enrichment pass.
//!
//! [`ServiceLineAttacher`] walks a batch of invoices and attaches the
//! [`ServiceLine`] referenced by each item's subscription. Lookups go through a
//! [`ServiceLineCache`] that lives for exactly one batch.

mod attach;
mod builder;
mod cache;
mod error;
mod store;
mod types;

pub use attach::*;
pub use builder::*;
pub use cache::*;
pub use error::*;
pub use store::*;
pub use types::*;

use crate::core::{EnrichError, Invoice, ServiceLineAttacher, ServiceLineStore};

/// Decode a JSON array of invoices without enriching them.
///
/// # Errors
///
/// Returns [`EnrichError::Data`] if `data` is not a valid invoice array.
pub fn parse_invoices(data: &str) -> Result<Vec<Invoice>, EnrichError> {
    serde_json::from_str(data).map_err(|e| EnrichError::Data(e.to_string()))
}

/// Decode a JSON array of invoices and attach their service lines in one batch.
pub fn new_collection<S: ServiceLineStore>(
    data: &str,
    attacher: &ServiceLineAttacher<S>,
) -> Result<Vec<Invoice>, EnrichError> {
    let invoices = parse_invoices(data)?;
    tracing::debug!(invoices = invoices.len(), "invoice collection decoded");
    attacher.attach(invoices)
}

use tracing::{debug, debug_span, warn};

use super::cache::ServiceLineCache;
use super::error::EnrichError;
use super::store::ServiceLineStore;
use super::types::{Invoice, Subscription};

/// What to do when the store has no record for an item's service line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingServiceLine {
    /// Abort the whole call with [`EnrichError::NotFound`].
    #[default]
    Fail,
    /// Leave the item without a service line and continue.
    Skip,
}

/// Counters for one enrichment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttachStats {
    /// Items that received a service line.
    pub items_enriched: usize,
    /// Items whose service line was not found (only with [`MissingServiceLine::Skip`]).
    pub items_missing: usize,
    /// Store calls issued during the pass.
    pub loads: usize,
}

/// Attaches service lines to the items of invoice batches.
///
/// Every call to [`attach`](Self::attach) or [`attach_one`](Self::attach_one)
/// uses a fresh [`ServiceLineCache`], so identifiers shared across a batch
/// are loaded once and nothing is carried over to the next call.
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
/// use servicelines::core::*;
///
/// let store = MemoryStore::new().with(ServiceLineBuilder::new("abcdef1234", "Fiber 500").build());
/// let attacher = ServiceLineAttacher::new(&store);
///
/// let invoice = |id: &str| {
///     InvoiceBuilder::new(id, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
///         .add_item(InvoiceItemBuilder::new("1", "Fiber 500", dec!(1), dec!(49.90))
///             .subscription(Subscription::new("SUB-1").with_service_line("abcdef1234"))
///             .build())
///         .build()
/// };
///
/// let invoices = attacher.attach(vec![invoice("INV-1"), invoice("INV-2")]).unwrap();
/// let first = invoices[0].items[0].service_line.as_ref().unwrap();
/// let second = invoices[1].items[0].service_line.as_ref().unwrap();
/// assert!(Arc::ptr_eq(first, second));
/// assert_eq!(store.lookups(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceLineAttacher<S> {
    store: S,
    on_missing: MissingServiceLine,
}

impl<S: ServiceLineStore> ServiceLineAttacher<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            on_missing: MissingServiceLine::default(),
        }
    }

    /// Set the policy for identifiers the store does not know.
    pub fn on_missing(mut self, policy: MissingServiceLine) -> Self {
        self.on_missing = policy;
        self
    }

    pub fn missing_policy(&self) -> MissingServiceLine {
        self.on_missing
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Enrich a batch, returning the invoices in input order.
    ///
    /// # Errors
    ///
    /// Fails on the first [`EnrichError::Load`], and on the first
    /// [`EnrichError::NotFound`] unless the policy is [`MissingServiceLine::Skip`].
    pub fn attach(&self, invoices: Vec<Invoice>) -> Result<Vec<Invoice>, EnrichError> {
        self.attach_with_stats(invoices).map(|(invoices, _)| invoices)
    }

    /// Like [`attach`](Self::attach), also returning the pass counters.
    pub fn attach_with_stats(
        &self,
        mut invoices: Vec<Invoice>,
    ) -> Result<(Vec<Invoice>, AttachStats), EnrichError> {
        let span = debug_span!("attach_service_lines", invoices = invoices.len());
        let _enter = span.enter();

        let mut cache = ServiceLineCache::new(&self.store);
        let stats = self.attach_in(&mut invoices, &mut cache)?;
        cache.reset();

        debug!(
            enriched = stats.items_enriched,
            missing = stats.items_missing,
            loads = stats.loads,
            "service lines attached"
        );
        Ok((invoices, stats))
    }

    /// Enrich a single invoice in its own cache scope.
    pub fn attach_one(&self, mut invoice: Invoice) -> Result<Invoice, EnrichError> {
        let span = debug_span!("attach_service_lines", invoice = %invoice.id);
        let _enter = span.enter();

        let mut cache = ServiceLineCache::new(&self.store);
        self.attach_in(std::slice::from_mut(&mut invoice), &mut cache)?;
        cache.reset();
        Ok(invoice)
    }

    /// Enrich invoices in place through a caller-owned cache.
    ///
    /// The cache is built on this attacher's store, e.g.
    /// `ServiceLineCache::new(attacher.store())`. Use this to spread one batch
    /// over several calls; identifiers already in `cache` are not loaded again.
    /// On error the invoices processed so far keep their attached service lines.
    pub fn attach_in(
        &self,
        invoices: &mut [Invoice],
        cache: &mut ServiceLineCache<'_, S>,
    ) -> Result<AttachStats, EnrichError> {
        let loads_before = cache.loads();
        let mut stats = AttachStats::default();

        for invoice in invoices.iter_mut() {
            for item in invoice.items.iter_mut() {
                let Some(id) = item
                    .subscription
                    .as_ref()
                    .and_then(Subscription::resolvable_id)
                else {
                    continue;
                };

                match cache.resolve(id) {
                    Ok(line) => {
                        item.service_line = Some(line);
                        stats.items_enriched += 1;
                    }
                    Err(EnrichError::NotFound { .. })
                        if self.on_missing == MissingServiceLine::Skip =>
                    {
                        warn!(
                            invoice_id = %invoice.id,
                            item_id = %item.id,
                            service_line_id = %id,
                            "service line not found, item left without one"
                        );
                        item.service_line = None;
                        stats.items_missing += 1;
                    }
                    Err(err) => {
                        stats.loads = cache.loads() - loads_before;
                        debug!(loads = stats.loads, error = %err, "service line attachment aborted");
                        return Err(err);
                    }
                }
            }
        }

        stats.loads = cache.loads() - loads_before;
        Ok(stats)
    }
}

impl Invoice {
    /// Attach service lines to this invoice alone. See [`ServiceLineAttacher::attach_one`].
    pub fn attach_service_lines<S: ServiceLineStore>(
        self,
        attacher: &ServiceLineAttacher<S>,
    ) -> Result<Invoice, EnrichError> {
        attacher.attach_one(self)
    }
}

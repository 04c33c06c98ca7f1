use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::error::EnrichError;
use super::store::ServiceLineStore;
use super::types::{ServiceLine, ServiceLineId};

/// Per-batch cache of loaded service lines.
///
/// A cache borrows its store and lives for exactly one enrichment batch.
/// The first [`resolve`](Self::resolve) of an identifier loads it from the
/// store; later calls hand out the same `Arc`. Failed loads are not cached,
/// so resolving the identifier again retries the store.
///
/// [`reset`](Self::reset) consumes the cache. Dropping it has the same
/// effect, so there is no way to carry entries into another batch.
///
/// ```
/// use std::sync::Arc;
/// use servicelines::core::*;
///
/// let store = MemoryStore::new().with(ServiceLineBuilder::new("abc", "Fiber 500").build());
/// let mut cache = ServiceLineCache::new(&store);
///
/// let first = cache.resolve(&"abc".into()).unwrap();
/// let second = cache.resolve(&"abc".into()).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(store.lookups(), 1);
///
/// cache.reset();
/// ```
pub struct ServiceLineCache<'s, S: ServiceLineStore + ?Sized> {
    store: &'s S,
    entries: HashMap<ServiceLineId, Arc<ServiceLine>>,
    loads: usize,
}

impl<'s, S: ServiceLineStore + ?Sized> ServiceLineCache<'s, S> {
    /// Create an empty cache in front of `store`.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            entries: HashMap::new(),
            loads: 0,
        }
    }

    /// Return the service line for `id`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::NotFound`] if the store has no such record and
    /// [`EnrichError::Load`] if the store failed. Neither outcome is cached.
    pub fn resolve(&mut self, id: &ServiceLineId) -> Result<Arc<ServiceLine>, EnrichError> {
        if let Some(line) = self.entries.get(id) {
            trace!(service_line_id = %id, "service line cache hit");
            return Ok(Arc::clone(line));
        }

        self.loads += 1;
        debug!(service_line_id = %id, "loading service line");
        let line = self
            .store
            .find_by_id(id)
            .map_err(|err| EnrichError::from_store(id, err))?;

        let line = Arc::new(line);
        self.entries.insert(id.clone(), Arc::clone(&line));
        Ok(line)
    }

    /// Cached service line for `id`, without touching the store.
    pub fn get(&self, id: &ServiceLineId) -> Option<&Arc<ServiceLine>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ServiceLineId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of cached service lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of store calls issued by this cache, failed ones included.
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Discard every cached entry and end the cache's lifetime.
    pub fn reset(self) {
        debug!(
            entries = self.entries.len(),
            loads = self.loads,
            "service line cache discarded"
        );
    }
}

impl<S: ServiceLineStore + ?Sized> fmt::Debug for ServiceLineCache<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLineCache")
            .field("entries", &self.entries.len())
            .field("loads", &self.loads)
            .finish_non_exhaustive()
    }
}

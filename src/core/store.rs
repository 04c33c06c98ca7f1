use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::error::StoreError;
use super::types::{ServiceLine, ServiceLineId};

/// Source of service line records, typically backed by a remote API or a database.
///
/// Lookups are synchronous and may be slow. Callers that resolve many items
/// go through a [`ServiceLineCache`](super::ServiceLineCache) so each identifier
/// is loaded once per batch.
pub trait ServiceLineStore {
    /// Load the service line with the given identifier.
    fn find_by_id(&self, id: &ServiceLineId) -> Result<ServiceLine, StoreError>;
}

impl<S: ServiceLineStore + ?Sized> ServiceLineStore for &S {
    fn find_by_id(&self, id: &ServiceLineId) -> Result<ServiceLine, StoreError> {
        (**self).find_by_id(id)
    }
}

impl<S: ServiceLineStore + ?Sized> ServiceLineStore for Box<S> {
    fn find_by_id(&self, id: &ServiceLineId) -> Result<ServiceLine, StoreError> {
        (**self).find_by_id(id)
    }
}

impl<S: ServiceLineStore + ?Sized> ServiceLineStore for Arc<S> {
    fn find_by_id(&self, id: &ServiceLineId) -> Result<ServiceLine, StoreError> {
        (**self).find_by_id(id)
    }
}

/// Store backed by a closure. Created with [`store_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnStore<F>(F);

/// Wrap a lookup closure as a [`ServiceLineStore`].
///
/// ```
/// use servicelines::core::*;
///
/// let store = store_fn(|id: &ServiceLineId| {
///     Ok(ServiceLineBuilder::new(id.clone(), "DSL 100").build())
/// });
/// assert_eq!(store.find_by_id(&"abc".into()).unwrap().name, "DSL 100");
/// ```
pub fn store_fn<F>(f: F) -> FnStore<F>
where
    F: Fn(&ServiceLineId) -> Result<ServiceLine, StoreError>,
{
    FnStore(f)
}

impl<F> ServiceLineStore for FnStore<F>
where
    F: Fn(&ServiceLineId) -> Result<ServiceLine, StoreError>,
{
    fn find_by_id(&self, id: &ServiceLineId) -> Result<ServiceLine, StoreError> {
        (self.0)(id)
    }
}

/// In-memory store that counts lookups.
///
/// Identifiers can be marked unavailable to simulate a failing backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<ServiceLineId, ServiceLine>,
    unavailable: HashSet<ServiceLineId>,
    lookups: Cell<usize>,
    lookups_by_id: RefCell<HashMap<ServiceLineId, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record.
    pub fn insert(&mut self, line: ServiceLine) {
        self.records.insert(line.id.clone(), line);
    }

    pub fn with(mut self, line: ServiceLine) -> Self {
        self.insert(line);
        self
    }

    /// Make lookups for `id` fail with [`StoreError::Unavailable`] until
    /// [`restore`](Self::restore) is called.
    pub fn mark_unavailable(&mut self, id: impl Into<ServiceLineId>) {
        self.unavailable.insert(id.into());
    }

    pub fn restore(&mut self, id: &ServiceLineId) {
        self.unavailable.remove(id);
    }

    /// Total number of `find_by_id` calls, failed ones included.
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    /// Number of `find_by_id` calls for one identifier.
    pub fn lookups_for(&self, id: &ServiceLineId) -> usize {
        self.lookups_by_id.borrow().get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ServiceLine> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = ServiceLine>>(iter: I) -> Self {
        let mut store = Self::new();
        for line in iter {
            store.insert(line);
        }
        store
    }
}

impl ServiceLineStore for MemoryStore {
    fn find_by_id(&self, id: &ServiceLineId) -> Result<ServiceLine, StoreError> {
        self.lookups.set(self.lookups.get() + 1);
        *self.lookups_by_id.borrow_mut().entry(id.clone()).or_insert(0) += 1;

        if self.unavailable.contains(id) {
            return Err(StoreError::Unavailable(format!(
                "service line {id} is temporarily unavailable"
            )));
        }
        self.records.get(id).cloned().ok_or(StoreError::NotFound)
    }
}

use dashmap::DashMap;
use lazyrows_core::RowId;
use std::sync::Arc;

/// Slow column results keyed by row id.
///
/// Entries live as long as the store. Ids are not scoped to a batch: a new
/// `/rows` call reuses ids 1..=N and each finished computation overwrites
/// whatever an earlier batch stored under the same id (last write wins).
#[derive(Debug, Clone, Default)]
pub struct SlowResultStore {
    values: Arc<DashMap<RowId, String>>,
}

impl SlowResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: RowId, value: impl Into<String>) {
        self.values.insert(id, value.into());
    }

    pub fn get(&self, id: RowId) -> Option<String> {
        self.values.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

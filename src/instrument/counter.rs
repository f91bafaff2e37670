use crate::instrument::state::{ObservationGuard, ObservationState};
use crate::metrics::{Point, Storage, Tags};
use std::sync::Arc;

/// Single-use counter observation.
///
/// However many threads call [`Counter::value`], only the first records.
pub struct Counter {
    name: String,
    tags: Tags,
    storage: Arc<dyn Storage>,
    guard: ObservationGuard,
}

impl Counter {
    pub(crate) fn new(name: String, storage: Arc<dyn Storage>) -> Self {
        Self {
            name,
            tags: Tags::new(),
            storage,
            guard: ObservationGuard::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key, value);
        self
    }

    /// Record `value`; returns false if this counter already recorded
    pub fn value(&self, value: i64) -> bool {
        if !self.guard.finish() {
            return false;
        }
        self.storage
            .store(&self.name, Point::new(self.tags.clone(), value));
        true
    }

    /// Record an occurrence count of one
    pub fn count(&self) -> bool {
        self.value(1)
    }

    pub fn is_recorded(&self) -> bool {
        self.guard.is(ObservationState::Ended)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

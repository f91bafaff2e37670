//! Entry point used by instrumented code.

use crate::core::StoreConfig;
use crate::instrument::counter::Counter;
use crate::instrument::timer::Timer;
use crate::metrics::{
    Point, Storage, Tags, TimeWindowIndex, TIMER_COUNT_SUFFIX, TIMER_SUM_SUFFIX,
};
use std::sync::Arc;

/// Records counts and timings into a shared [`Storage`].
///
/// Cheap to clone; every clone writes to the same storage.
#[derive(Clone)]
pub struct Recorder {
    storage: Arc<dyn Storage>,
}

impl Recorder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Recorder over a fresh [`TimeWindowIndex`]
    pub fn with_config(config: StoreConfig) -> Self {
        Self::new(Arc::new(TimeWindowIndex::new(config)))
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Record `value` occurrences under `name`
    pub fn count(&self, name: &str, tags: impl Into<Tags>, value: i64) {
        self.storage.store(name, Point::new(tags, value));
    }

    /// Record a duration of `value` milliseconds under `name`
    pub fn timer(&self, name: &str, tags: impl Into<Tags>, value: i64) {
        record_timer(self.storage.as_ref(), name, &tags.into(), value);
    }

    pub fn new_counter(&self, name: impl Into<String>) -> Counter {
        Counter::new(name.into(), Arc::clone(&self.storage))
    }

    pub fn new_timer(&self, name: impl Into<String>) -> Timer {
        Timer::new(name.into(), Arc::clone(&self.storage))
    }
}

/// Write one timing as a `_sum` point carrying `value` and a `_count` point carrying one
pub(crate) fn record_timer(storage: &dyn Storage, name: &str, tags: &Tags, value: i64) {
    storage.store(
        &format!("{name}{TIMER_SUM_SUFFIX}"),
        Point::new(tags.clone(), value),
    );
    storage.store(
        &format!("{name}{TIMER_COUNT_SUFFIX}"),
        Point::new(tags.clone(), 1),
    );
}

use crate::instrument::recorder::record_timer;
use crate::instrument::state::{ObservationGuard, ObservationState};
use crate::metrics::{Storage, Tags};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;

/// Single-use timer observation.
///
/// A recorded duration is written as two series: `<name>_sum` with the
/// duration in milliseconds and `<name>_count` with one.
pub struct Timer {
    name: String,
    tags: Tags,
    storage: Arc<dyn Storage>,
    guard: ObservationGuard,
    started_at: OnceCell<Instant>,
}

impl Timer {
    pub(crate) fn new(name: String, storage: Arc<dyn Storage>) -> Self {
        Self {
            name,
            tags: Tags::new(),
            storage,
            guard: ObservationGuard::new(),
            started_at: OnceCell::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key, value);
        self
    }

    /// Mark the start instant; later calls keep the first one
    pub fn start(&self) {
        if self.started_at.set(Instant::now()).is_ok() {
            self.guard
                .transition(ObservationState::NotStarted, ObservationState::Started);
        }
    }

    /// Record the whole milliseconds elapsed since [`Timer::start`].
    ///
    /// Returns false without recording if the timer was never started or
    /// has already recorded.
    pub fn end(&self) -> bool {
        let Some(started_at) = self.started_at.get() else {
            return false;
        };
        let elapsed_ms = i64::try_from(started_at.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.value(elapsed_ms)
    }

    /// Record `value` milliseconds directly; returns false if already recorded
    pub fn value(&self, value: i64) -> bool {
        if !self.guard.finish() {
            return false;
        }
        record_timer(self.storage.as_ref(), &self.name, &self.tags, value);
        true
    }

    pub fn state(&self) -> ObservationState {
        self.guard.state()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TimeWindowIndex;

    fn timer(store: &Arc<TimeWindowIndex>) -> Timer {
        Timer::new("db".to_string(), Arc::clone(store) as Arc<dyn Storage>).with_tag("op", "read")
    }

    fn total(store: &TimeWindowIndex, metric: &str) -> i64 {
        store
            .load_all_time_range(metric)
            .values()
            .flatten()
            .map(|p| p.value())
            .sum()
    }

    #[test]
    fn test_end_without_start_is_noop() {
        let store = Arc::new(TimeWindowIndex::default());
        let timer = timer(&store);

        assert!(!timer.end());
        assert_eq!(timer.state(), ObservationState::NotStarted);
        assert!(store.is_empty());
    }

    #[test]
    fn test_start_end_records_sum_and_count() {
        let store = Arc::new(TimeWindowIndex::default());
        let timer = timer(&store);

        timer.start();
        assert_eq!(timer.state(), ObservationState::Started);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.end());
        assert!(!timer.end());

        assert_eq!(timer.state(), ObservationState::Ended);
        assert!(total(&store, "db_sum") >= 5);
        assert_eq!(total(&store, "db_count"), 1);
    }

    #[test]
    fn test_value_records_once() {
        let store = Arc::new(TimeWindowIndex::default());
        let timer = timer(&store);

        assert!(timer.value(120));
        assert!(!timer.value(80));
        timer.start();
        assert!(!timer.end());

        assert_eq!(total(&store, "db_sum"), 120);
        assert_eq!(total(&store, "db_count"), 1);
        assert!(total(&store, "db") == 0);
    }
}

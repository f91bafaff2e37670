//! Top-level store: one bucket per second, bounded by count.
//!
//! Buckets are created lazily on first write and evicted oldest-created
//! first once more than `max_time_buckets` are live. Eviction follows
//! creation order, not timestamp order: a point stamped in the past creates
//! a bucket that is treated as the newest.

use crate::core::StoreConfig;
use crate::metrics::bucket::MetricBucket;
use crate::metrics::point::Point;
use crate::metrics::storage::{
    PointList, Storage, StoreCounters, StoreOutcome, StoreStats, TimeRange, WindowMap,
};
use crate::metrics::types::bucket_key;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Time-windowed, three-tier aggregation store
#[derive(Debug)]
pub struct TimeWindowIndex {
    config: StoreConfig,
    inner: RwLock<WindowInner>,
    counters: StoreCounters,
}

/// Map and creation-ordered queue always hold the same buckets.
#[derive(Debug, Default)]
struct WindowInner {
    by_key: AHashMap<String, Arc<MetricBucket>>,
    order: VecDeque<Arc<MetricBucket>>,
}

impl TimeWindowIndex {
    /// Create a store from capacity configuration.
    ///
    /// A zero `max_time_buckets` is raised to one so the newest bucket always survives.
    pub fn new(mut config: StoreConfig) -> Self {
        config.max_time_buckets = config.max_time_buckets.max(1);
        Self {
            config,
            inner: RwLock::new(WindowInner {
                by_key: AHashMap::with_capacity(config.max_time_buckets + 1),
                order: VecDeque::with_capacity(config.max_time_buckets + 1),
            }),
            counters: StoreCounters::default(),
        }
    }

    /// Create a store with the default overflow policy
    pub fn with_limits(
        max_time_buckets: usize,
        max_points_per_series: usize,
        max_metrics_per_bucket: usize,
    ) -> Self {
        Self::new(StoreConfig {
            max_time_buckets,
            max_points_per_series,
            max_metrics_per_bucket,
            ..StoreConfig::default()
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self, metric_name: &str, point: Point) -> StoreOutcome {
        let bucket = self.get_or_create(bucket_key(point.time()));
        // A bucket evicted after this lookup still accepts the write; it is lost with it
        let outcome = bucket.store(metric_name, point);
        self.counters.record(outcome);
        outcome
    }

    pub fn load(&self, metric_name: &str, time: DateTime<Utc>) -> PointList {
        self.get(&bucket_key(time))
            .map(|bucket| bucket.load(metric_name))
            .unwrap_or_default()
    }

    pub fn load_all_time_range(&self, metric_name: &str) -> TimeRange {
        let inner = self.inner.read();
        inner
            .by_key
            .iter()
            .map(|(key, bucket)| (key.clone(), bucket.load(metric_name)))
            .collect()
    }

    /// Snapshot of every live bucket, taken under the shared lock
    pub fn load_all(&self) -> WindowMap {
        let inner = self.inner.read();
        inner
            .by_key
            .iter()
            .map(|(key, bucket)| (key.clone(), bucket.load_all()))
            .collect()
    }

    /// Bucket for `key`, without creating it
    pub fn get(&self, key: &str) -> Option<Arc<MetricBucket>> {
        self.inner.read().by_key.get(key).map(Arc::clone)
    }

    /// Live bucket keys, oldest-created first
    pub fn bucket_keys(&self) -> Vec<String> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .map(|bucket| bucket.key().to_owned())
            .collect()
    }

    /// Number of live buckets
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> StoreStats {
        self.counters.snapshot(self.len())
    }

    /// Double-checked lazy creation, evicting the oldest bucket past capacity
    fn get_or_create(&self, key: String) -> Arc<MetricBucket> {
        if let Some(bucket) = self.get(&key) {
            return bucket;
        }

        let mut inner = self.inner.write();
        if let Some(bucket) = inner.by_key.get(&key) {
            return Arc::clone(bucket);
        }

        let bucket = Arc::new(MetricBucket::new(key.clone(), self.config));
        inner.by_key.insert(key, Arc::clone(&bucket));
        inner.order.push_back(Arc::clone(&bucket));
        self.counters.bucket_created();
        tracing::debug!(bucket = bucket.key(), live = inner.order.len(), "Created time bucket");

        if inner.order.len() > self.config.max_time_buckets {
            if let Some(oldest) = inner.order.pop_front() {
                inner.by_key.remove(oldest.key());
                self.counters.bucket_evicted();
                tracing::debug!(
                    bucket = oldest.key(),
                    metrics = oldest.len(),
                    "Evicted oldest time bucket"
                );
            }
        }

        bucket
    }
}

impl Default for TimeWindowIndex {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Storage for TimeWindowIndex {
    fn store(&self, metric_name: &str, point: Point) -> StoreOutcome {
        TimeWindowIndex::store(self, metric_name, point)
    }

    fn load(&self, metric_name: &str, time: DateTime<Utc>) -> PointList {
        TimeWindowIndex::load(self, metric_name, time)
    }

    fn load_all_time_range(&self, metric_name: &str) -> TimeRange {
        TimeWindowIndex::load_all_time_range(self, metric_name)
    }

    fn load_all(&self) -> WindowMap {
        TimeWindowIndex::load_all(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OverflowPolicy;
    use crate::metrics::types::Tags;
    use chrono::TimeZone;

    const BASE: i64 = 1_700_000_000;

    fn second(offset: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(BASE + offset, 0).unwrap()
    }

    fn point_at(offset: i64, value: i64) -> Point {
        Point::at(Tags::from([("host", "a")]), value, second(offset))
    }

    #[test]
    fn test_request_codes_scenario() {
        let store = TimeWindowIndex::default();
        let now = second(0);
        for code in ["200", "200", "500"] {
            store.store("req", Point::at(Tags::from([("code", code)]), 1, now));
        }

        let points = store.load("req", now);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].aggregation_key(), "code200");
        assert_eq!(points[0].value(), 2);
        assert_eq!(points[1].aggregation_key(), "code500");
        assert_eq!(points[1].value(), 1);
    }

    #[test]
    fn test_bucket_isolation() {
        let store = TimeWindowIndex::default();
        store.store("req", point_at(0, 1));

        let within = Utc.timestamp_opt(BASE, 999_999_999).unwrap();
        assert_eq!(store.load("req", within).len(), 1);
        assert!(store.load("req", second(1)).is_empty());
        assert!(store.load("req", second(-1)).is_empty());
    }

    #[test]
    fn test_load_does_not_create_buckets() {
        let store = TimeWindowIndex::default();
        assert!(store.load("req", second(0)).is_empty());
        assert!(store.load_all_time_range("req").is_empty());
        assert!(store.load_all().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_evicts_oldest_created_bucket() {
        let store = TimeWindowIndex::with_limits(2, 100, 100);
        for offset in 0..5 {
            store.store("req", point_at(offset, 1));
            assert!(store.len() <= 2);
        }

        assert_eq!(
            store.bucket_keys(),
            vec![(BASE + 3).to_string(), (BASE + 4).to_string()]
        );
        assert!(store.load("req", second(0)).is_empty());

        let stats = store.stats();
        assert_eq!(stats.buckets_created, 5);
        assert_eq!(stats.buckets_evicted, 3);
        assert_eq!(stats.live_buckets, 2);
    }

    #[test]
    fn test_eviction_follows_creation_not_time() {
        let store = TimeWindowIndex::with_limits(2, 100, 100);
        store.store("req", point_at(10, 1));
        store.store("req", point_at(11, 1));
        // Late point for an older second is the newest-created bucket
        store.store("req", point_at(5, 1));

        assert_eq!(
            store.bucket_keys(),
            vec![(BASE + 11).to_string(), (BASE + 5).to_string()]
        );
    }

    #[test]
    fn test_zero_bucket_limit_keeps_newest() {
        let store = TimeWindowIndex::with_limits(0, 100, 100);
        store.store("req", point_at(0, 1));
        store.store("req", point_at(1, 1));

        assert_eq!(store.len(), 1);
        assert_eq!(store.load("req", second(1))[0].value(), 1);
    }

    #[test]
    fn test_load_all_time_range_fills_missing_metric() {
        let store = TimeWindowIndex::default();
        store.store("req", point_at(0, 1));
        store.store("err", point_at(1, 1));

        let range = store.load_all_time_range("req");
        assert_eq!(range.len(), 2);
        assert_eq!(range[&BASE.to_string()].len(), 1);
        assert!(range[&(BASE + 1).to_string()].is_empty());
    }

    #[test]
    fn test_load_all_nests_buckets_and_metrics() {
        let store = TimeWindowIndex::default();
        store.store("req", point_at(0, 1));
        store.store("err", point_at(0, 2));
        store.store("req", point_at(1, 3));

        let all = store.load_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&BASE.to_string()].len(), 2);
        assert_eq!(all[&(BASE + 1).to_string()]["req"][0].value(), 3);
    }

    #[test]
    fn test_outcomes_are_counted() {
        let store = TimeWindowIndex::new(StoreConfig {
            max_points_per_series: 1,
            overflow: OverflowPolicy::Reject,
            ..StoreConfig::default()
        });

        assert_eq!(store.store("req", point_at(0, 1)), StoreOutcome::Inserted);
        assert_eq!(store.store("req", point_at(0, 1)), StoreOutcome::Merged);
        let other = Point::at(Tags::from([("host", "b")]), 1, second(0));
        assert_eq!(store.store("req", other), StoreOutcome::Dropped);

        let stats = store.stats();
        assert_eq!(stats.points_inserted, 1);
        assert_eq!(stats.points_merged, 1);
        assert_eq!(stats.points_dropped, 1);
    }

    #[test]
    fn test_usable_through_trait_object() {
        let store: Arc<dyn Storage> = Arc::new(TimeWindowIndex::default());
        store.store("req", point_at(0, 4));
        assert_eq!(store.load("req", second(0))[0].value(), 4);
        assert_eq!(store.load_all().len(), 1);
    }
}

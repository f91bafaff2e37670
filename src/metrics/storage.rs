//! Storage seam between the instrumentation façade and the aggregation engine.

use crate::metrics::point::Point;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Points of one series, in first-insertion order
pub type PointList = Vec<Arc<Point>>;

/// Metric name -> points, for one bucket
pub type MetricMap = HashMap<String, PointList>;

/// Bucket key -> points, for one metric across all live buckets
pub type TimeRange = HashMap<String, PointList>;

/// Bucket key -> metric name -> points, the whole store
pub type WindowMap = HashMap<String, MetricMap>;

/// What a single store did with its point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The point became a new resident entry
    Inserted,
    /// The point's value was added into an existing entry
    Merged,
    /// The point was discarded because a capacity limit was reached
    Dropped,
}

/// Aggregated-observation storage.
///
/// Writes never fail and reads of missing buckets or metrics return empty
/// results. Implementations must be safe to share between threads.
pub trait Storage: Send + Sync {
    /// Aggregate `point` under `metric_name` in the bucket of its creation second
    fn store(&self, metric_name: &str, point: Point) -> StoreOutcome;

    /// Points for `metric_name` in the bucket containing `time`
    fn load(&self, metric_name: &str, time: DateTime<Utc>) -> PointList;

    /// Points for `metric_name` in every live bucket
    fn load_all_time_range(&self, metric_name: &str) -> TimeRange;

    /// Every metric in every live bucket
    fn load_all(&self) -> WindowMap;
}

/// Point-in-time view of store activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub live_buckets: usize,
    pub buckets_created: u64,
    pub buckets_evicted: u64,
    pub points_inserted: u64,
    pub points_merged: u64,
    pub points_dropped: u64,
}

/// Lock-free activity counters
#[derive(Debug, Default)]
pub(crate) struct StoreCounters {
    buckets_created: AtomicU64,
    buckets_evicted: AtomicU64,
    points_inserted: AtomicU64,
    points_merged: AtomicU64,
    points_dropped: AtomicU64,
}

impl StoreCounters {
    #[inline]
    pub(crate) fn record(&self, outcome: StoreOutcome) {
        let counter = match outcome {
            StoreOutcome::Inserted => &self.points_inserted,
            StoreOutcome::Merged => &self.points_merged,
            StoreOutcome::Dropped => &self.points_dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bucket_created(&self) {
        self.buckets_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bucket_evicted(&self) {
        self.buckets_evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, live_buckets: usize) -> StoreStats {
        StoreStats {
            live_buckets,
            buckets_created: self.buckets_created.load(Ordering::Relaxed),
            buckets_evicted: self.buckets_evicted.load(Ordering::Relaxed),
            points_inserted: self.points_inserted.load(Ordering::Relaxed),
            points_merged: self.points_merged.load(Ordering::Relaxed),
            points_dropped: self.points_dropped.load(Ordering::Relaxed),
        }
    }
}

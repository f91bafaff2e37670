//! Per-metric, per-bucket point set keyed by aggregation key.

use crate::core::OverflowPolicy;
use crate::metrics::point::Point;
use crate::metrics::storage::{PointList, StoreOutcome};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// All points of one metric name within one time bucket.
///
/// Points sharing an aggregation key merge into the first one stored;
/// distinct keys are kept in first-insertion order.
#[derive(Debug)]
pub struct AggregationSeries {
    max_points: usize,
    overflow: OverflowPolicy,
    inner: RwLock<SeriesInner>,
    overflow_logged: AtomicBool,
}

/// Map and sequence always hold the same set of points.
#[derive(Debug, Default)]
struct SeriesInner {
    by_key: AHashMap<String, Arc<Point>>,
    order: Vec<Arc<Point>>,
}

impl AggregationSeries {
    pub fn new(max_points: usize, overflow: OverflowPolicy) -> Self {
        Self {
            max_points,
            overflow,
            inner: RwLock::new(SeriesInner::default()),
            overflow_logged: AtomicBool::new(false),
        }
    }

    /// Merge `point` into the resident point with the same key, or insert it.
    pub fn store(&self, point: Point) -> StoreOutcome {
        // Fast path: the key is already resident, add without exclusive access
        {
            let inner = self.inner.read();
            if let Some(resident) = inner.by_key.get(point.aggregation_key()) {
                resident.merge(&point);
                return StoreOutcome::Merged;
            }
        }

        let mut inner = self.inner.write();
        // Another writer may have inserted the key while we waited
        if let Some(resident) = inner.by_key.get(point.aggregation_key()) {
            resident.merge(&point);
            return StoreOutcome::Merged;
        }

        if inner.order.len() >= self.max_points && self.overflow == OverflowPolicy::Reject {
            drop(inner);
            self.log_overflow(point.aggregation_key());
            return StoreOutcome::Dropped;
        }

        let key = point.aggregation_key().to_owned();
        let point = Arc::new(point);
        inner.by_key.insert(key, Arc::clone(&point));
        inner.order.push(point);
        StoreOutcome::Inserted
    }

    /// Resident points in first-insertion order.
    ///
    /// The returned points stay live: later merges remain visible through them.
    pub fn load(&self) -> PointList {
        self.inner.read().order.clone()
    }

    /// Resident point for `key`, if any
    pub fn get(&self, key: &str) -> Option<Arc<Point>> {
        self.inner.read().by_key.get(key).map(Arc::clone)
    }

    /// Number of resident points
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn log_overflow(&self, key: &str) {
        if !self.overflow_logged.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                max_points = self.max_points,
                key,
                "Series at capacity, dropping points with new aggregation keys"
            );
        }
    }
}

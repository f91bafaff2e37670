//! One second of observations, split by metric name.

use crate::core::{OverflowPolicy, StoreConfig};
use crate::metrics::point::Point;
use crate::metrics::series::AggregationSeries;
use crate::metrics::storage::{MetricMap, PointList, StoreOutcome};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Series for every metric name observed within one time bucket
#[derive(Debug)]
pub struct MetricBucket {
    key: String,
    config: StoreConfig,
    series: RwLock<AHashMap<String, Arc<AggregationSeries>>>,
    overflow_logged: AtomicBool,
}

impl MetricBucket {
    pub fn new(key: String, config: StoreConfig) -> Self {
        Self {
            key,
            config,
            series: RwLock::new(AHashMap::new()),
            overflow_logged: AtomicBool::new(false),
        }
    }

    /// Bucket key this bucket was created for
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self, metric_name: &str, point: Point) -> StoreOutcome {
        match self.get_or_create(metric_name) {
            Some(series) => series.store(point),
            None => StoreOutcome::Dropped,
        }
    }

    /// Points for `metric_name`, empty if it was never stored here
    pub fn load(&self, metric_name: &str) -> PointList {
        self.get(metric_name)
            .map(|series| series.load())
            .unwrap_or_default()
    }

    pub fn load_all(&self) -> MetricMap {
        let series = self.series.read();
        series
            .iter()
            .map(|(name, series)| (name.clone(), series.load()))
            .collect()
    }

    pub fn get(&self, metric_name: &str) -> Option<Arc<AggregationSeries>> {
        self.series.read().get(metric_name).map(Arc::clone)
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.series.read().keys().cloned().collect()
    }

    /// Number of distinct metric names
    pub fn len(&self) -> usize {
        self.series.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Double-checked lazy creation; `None` only when a reject policy is full
    fn get_or_create(&self, metric_name: &str) -> Option<Arc<AggregationSeries>> {
        if let Some(series) = self.get(metric_name) {
            return Some(series);
        }

        let mut map = self.series.write();
        if let Some(series) = map.get(metric_name) {
            return Some(Arc::clone(series));
        }

        if map.len() >= self.config.max_metrics_per_bucket
            && self.config.overflow == OverflowPolicy::Reject
        {
            drop(map);
            if !self.overflow_logged.swap(true, Ordering::Relaxed) {
                tracing::warn!(
                    bucket = %self.key,
                    max_metrics = self.config.max_metrics_per_bucket,
                    metric = metric_name,
                    "Bucket at capacity, dropping points for new metric names"
                );
            }
            return None;
        }

        let series = Arc::new(AggregationSeries::new(
            self.config.max_points_per_series,
            self.config.overflow,
        ));
        map.insert(metric_name.to_owned(), Arc::clone(&series));
        Some(series)
    }
}

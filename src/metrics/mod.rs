//! Time-windowed, three-tier metrics aggregation engine.
//!
//! Observations are sharded by time bucket (one second), then by metric name,
//! then by the aggregation key derived from their tags:
//!
//! ```text
//! TimeWindowIndex ── bucket key ──> MetricBucket ── metric name ──> AggregationSeries ── key ──> Point
//! ```
//!
//! Each tier owns an independent reader-writer lock over its own map; new
//! entries are created with a shared-lock probe followed by an exclusive
//! probe-and-create. Values of resident points are updated with atomic
//! addition, so hot keys never take an exclusive lock.

pub mod bucket;
pub mod point;
pub mod series;
pub mod snapshot;
pub mod storage;
pub mod types;
pub mod window;

pub use bucket::MetricBucket;
pub use point::Point;
pub use series::AggregationSeries;
pub use snapshot::{PointSnapshot, Snapshot};
pub use storage::{
    MetricMap, PointList, Storage, StoreOutcome, StoreStats, TimeRange, WindowMap,
};
pub use types::{aggregation_key, bucket_key, Tags, TIMER_COUNT_SUFFIX, TIMER_SUM_SUFFIX};
pub use window::TimeWindowIndex;

#[cfg(test)]
mod integration_test;

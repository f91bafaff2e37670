//! Common test utilities and fixtures.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use memmetric::core::StoreConfig;
use memmetric::metrics::{Point, Storage, Tags, TimeWindowIndex};
use std::sync::Arc;

/// Fixed second all fixtures are anchored to
pub const BASE_SECOND: i64 = 1_700_000_000;

/// Instant `offset` whole seconds after [`BASE_SECOND`]
pub fn second(offset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_SECOND + offset, 0).unwrap()
}

/// Bucket key for `offset` seconds after [`BASE_SECOND`]
pub fn key(offset: i64) -> String {
    (BASE_SECOND + offset).to_string()
}

/// Test fixture builder for creating points with sensible defaults.
pub struct TestPointBuilder {
    tags: Tags,
    value: i64,
    offset: i64,
}

impl TestPointBuilder {
    pub fn new(value: i64) -> Self {
        Self {
            tags: Tags::new(),
            value,
            offset: 0,
        }
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key, value);
        self
    }

    pub fn at_second(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn build(self) -> Point {
        Point::at(self.tags, self.value, second(self.offset))
    }
}

/// Store with `max_time_buckets` buckets and generous inner limits
pub fn store_with_buckets(max_time_buckets: usize) -> Arc<TimeWindowIndex> {
    Arc::new(TimeWindowIndex::new(StoreConfig {
        max_time_buckets,
        ..StoreConfig::default()
    }))
}

/// Sum of all values stored under `metric`, across buckets and keys
pub fn total(storage: &dyn Storage, metric: &str) -> i64 {
    storage
        .load_all_time_range(metric)
        .values()
        .flatten()
        .map(|p| p.value())
        .sum()
}

/// Sum of `metric` values whose point carries `tag = value`
pub fn total_where(storage: &dyn Storage, metric: &str, tag: &str, value: &str) -> i64 {
    storage
        .load_all_time_range(metric)
        .values()
        .flatten()
        .filter(|p| p.tags().get(tag) == Some(value))
        .map(|p| p.value())
        .sum()
}

//! A single accumulated observation.

use crate::metrics::types::{aggregation_key, Tags};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// One observation: tags, a running value and its creation time.
///
/// Tags and creation time are fixed at construction. The value only changes
/// through [`Point::merge`], which adds atomically, so a resident point can be
/// updated through a shared reference without taking its container's lock.
#[derive(Debug)]
pub struct Point {
    tags: Tags,
    value: AtomicI64,
    created_at: DateTime<Utc>,
    /// Cached aggregation key; tags never change after construction
    key: String,
}

impl Point {
    /// Create a point stamped with the current time
    pub fn new(tags: impl Into<Tags>, value: i64) -> Self {
        Self::at(tags, value, Utc::now())
    }

    /// Create a point with an explicit creation time, for observations whose
    /// time was captured elsewhere
    pub fn at(tags: impl Into<Tags>, value: i64, created_at: DateTime<Utc>) -> Self {
        let tags = tags.into();
        let key = aggregation_key(&tags);
        Self {
            tags,
            value: AtomicI64::new(value),
            created_at,
            key,
        }
    }

    #[inline]
    pub fn aggregation_key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn time(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current value; may be mid-flight while other threads merge
    #[inline]
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Add `other`'s value into this point
    #[inline]
    pub fn merge(&self, other: &Point) {
        self.value.fetch_add(other.value(), Ordering::AcqRel);
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.tags == other.tags
            && self.created_at == other.created_at
            && self.value() == other.value()
    }
}

//! Owned, serializable copies of store contents for reporters.

use crate::core::Result;
use crate::metrics::point::Point;
use crate::metrics::storage::Storage;
use crate::metrics::types::Tags;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Frozen copy of one point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointSnapshot {
    pub aggregation_key: String,
    pub tags: Tags,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Point> for PointSnapshot {
    fn from(point: &Point) -> Self {
        Self {
            aggregation_key: point.aggregation_key().to_owned(),
            tags: point.tags().clone(),
            value: point.value(),
            created_at: point.time(),
        }
    }
}

/// Bucket key -> metric name -> points, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    buckets: BTreeMap<String, BTreeMap<String, Vec<PointSnapshot>>>,
}

impl Snapshot {
    /// Copy everything currently held by `storage`
    pub fn capture(storage: &dyn Storage) -> Self {
        let buckets = storage
            .load_all()
            .into_iter()
            .map(|(bucket, metrics)| {
                let metrics = metrics
                    .into_iter()
                    .map(|(name, points)| {
                        let points = points.iter().map(|p| PointSnapshot::from(&**p)).collect();
                        (name, points)
                    })
                    .collect();
                (bucket, metrics)
            })
            .collect();
        Self { buckets }
    }

    pub fn buckets(&self) -> &BTreeMap<String, BTreeMap<String, Vec<PointSnapshot>>> {
        &self.buckets
    }

    /// Points of `metric` in `bucket`
    pub fn points(&self, bucket: &str, metric: &str) -> &[PointSnapshot] {
        self.buckets
            .get(bucket)
            .and_then(|metrics| metrics.get(metric))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sum of every value recorded under `metric`, across buckets and tags
    pub fn total(&self, metric: &str) -> i64 {
        self.buckets
            .values()
            .filter_map(|metrics| metrics.get(metric))
            .flatten()
            .map(|point| point.value)
            .sum()
    }

    /// Sum of `metric` values per aggregation key, across buckets
    pub fn totals_by_key(&self, metric: &str) -> BTreeMap<String, i64> {
        let mut totals = BTreeMap::new();
        for point in self
            .buckets
            .values()
            .filter_map(|metrics| metrics.get(metric))
            .flatten()
        {
            *totals.entry(point.aggregation_key.clone()).or_insert(0) += point.value;
        }
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

//! Tag sets and the key derivations that drive grouping.
//!
//! Two keys decide where an observation lands:
//! - the bucket key, the whole-second Unix timestamp of its creation time
//! - the aggregation key, its tags flattened in sorted key order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Suffix of the series holding a timer's summed durations
pub const TIMER_SUM_SUFFIX: &str = "_sum";
/// Suffix of the series holding a timer's observation count
pub const TIMER_COUNT_SUFFIX: &str = "_count";

/// Ordered set of string tags attached to an observation.
///
/// Keys are unique and iterate in lexicographic byte order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Empty tag set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace a tag, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a tag
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<Option<Tags>> for Tags {
    fn from(tags: Option<Tags>) -> Self {
        tags.unwrap_or_default()
    }
}

impl From<BTreeMap<String, String>> for Tags {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl From<HashMap<String, String>> for Tags {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Tags {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Derive the aggregation key: every key immediately followed by its value,
/// in sorted key order, with no separator.
///
/// Distinct tag sets can collide when the concatenation is ambiguous
/// (`{"a": "bc"}` and `{"ab": "c"}` both yield `"abc"`); such points merge.
pub fn aggregation_key(tags: &Tags) -> String {
    let capacity = tags.iter().map(|(k, v)| k.len() + v.len()).sum();
    let mut key = String::with_capacity(capacity);
    for (k, v) in tags.iter() {
        key.push_str(k);
        key.push_str(v);
    }
    key
}

/// Derive the bucket key: the whole-second Unix timestamp as decimal text
#[inline]
pub fn bucket_key(time: DateTime<Utc>) -> String {
    time.timestamp().to_string()
}

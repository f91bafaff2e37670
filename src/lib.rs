//! memmetric - in-process, time-windowed metrics aggregation.
//!
//! memmetric accepts point observations (counts and timer durations, each
//! tagged with key/value pairs) from many threads at once, groups them by
//! one-second time bucket and tag combination, and merges observations that
//! share a key into running sums.
//!
//! # Architecture
//!
//! - `metrics`: the three-tier aggregation engine and the `Storage` trait
//! - `instrument`: counter and timer façade writing through `Storage`
//! - `core`: configuration and error types
//! - `cli`: synthetic workload driver behind the binary
//!
//! # Example
//!
//! ```
//! use memmetric::core::StoreConfig;
//! use memmetric::instrument::Recorder;
//! use memmetric::metrics::{Snapshot, Tags};
//!
//! let recorder = Recorder::with_config(StoreConfig::default());
//! recorder.count("req", Tags::from([("code", "200")]), 1);
//! recorder.count("req", Tags::from([("code", "200")]), 1);
//! recorder.timer("db", Tags::new(), 42);
//!
//! let snapshot = Snapshot::capture(recorder.storage().as_ref());
//! assert_eq!(snapshot.total("req"), 2);
//! assert_eq!(snapshot.total("db_sum"), 42);
//! assert_eq!(snapshot.total("db_count"), 1);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod instrument;
pub mod metrics;

// Re-export the types most callers need
pub use crate::core::{Config, Result};
pub use crate::instrument::Recorder;
pub use crate::metrics::{Point, Storage, Tags, TimeWindowIndex};

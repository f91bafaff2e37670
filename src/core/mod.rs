//! Configuration and error types shared across memmetric.

#![warn(missing_docs)]

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel, OverflowPolicy, StoreConfig};
pub use error::{MetricError, Result};

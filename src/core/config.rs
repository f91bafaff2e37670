//! Configuration management for memmetric.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - CLI argument overrides (applied by the binary)
//! - Validation and defaults

use crate::core::{MetricError, Result};
use serde::{Deserialize, Serialize};

/// Complete configuration for memmetric
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Aggregation store capacities
    pub store: StoreConfig,
    /// Synthetic workload driven by the CLI
    pub load: LoadConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Capacity configuration for the aggregation store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of live one-second buckets before the oldest is evicted
    pub max_time_buckets: usize,
    /// Maximum distinct aggregation keys per metric per bucket
    pub max_points_per_series: usize,
    /// Maximum distinct metric names per bucket
    pub max_metrics_per_bucket: usize,
    /// What happens once the two maxima above are reached
    pub overflow: OverflowPolicy,
}

/// Behavior of the metric-name and aggregation-key tiers at capacity.
///
/// The time-bucket tier always evicts; this only governs the two inner tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Maxima are soft targets and the tiers grow without bound
    #[default]
    Unbounded,
    /// Observations that would create a new name or key past the maximum are dropped
    Reject,
}

/// Synthetic workload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of concurrent writers, each recording one count and one timer
    pub writers: usize,
    /// Number of distinct tag values writers are spread over
    pub tag_cardinality: usize,
    /// Duration each writer records on its timer, in milliseconds
    pub timer_value_ms: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Include thread ids and source locations in log lines
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_time_buckets: 60,        // one minute of one-second buckets
            max_points_per_series: 10_000,
            max_metrics_per_bucket: 1_000,
            overflow: OverflowPolicy::Unbounded,
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            writers: 10_000,
            tag_cardinality: 10,
            timer_value_ms: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;

        if self.load.writers == 0 {
            return Err(MetricError::InvalidCapacity { field: "writers" });
        }

        if self.load.tag_cardinality == 0 {
            return Err(MetricError::InvalidCapacity {
                field: "tag_cardinality",
            });
        }

        if self.load.timer_value_ms < 0 {
            return Err(MetricError::config(format!(
                "timer_value_ms must not be negative, got {}",
                self.load.timer_value_ms
            )));
        }

        Ok(())
    }
}

impl StoreConfig {
    /// Validate capacities; every maximum must be positive
    pub fn validate(&self) -> Result<()> {
        if self.max_time_buckets == 0 {
            return Err(MetricError::InvalidCapacity {
                field: "max_time_buckets",
            });
        }

        if self.max_points_per_series == 0 {
            return Err(MetricError::InvalidCapacity {
                field: "max_points_per_series",
            });
        }

        if self.max_metrics_per_bucket == 0 {
            return Err(MetricError::InvalidCapacity {
                field: "max_metrics_per_bucket",
            });
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| MetricError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set maximum live time buckets
    pub fn max_time_buckets(mut self, count: usize) -> Self {
        self.config.store.max_time_buckets = count;
        self
    }

    /// Set maximum aggregation keys per series
    pub fn max_points_per_series(mut self, count: usize) -> Self {
        self.config.store.max_points_per_series = count;
        self
    }

    /// Set maximum metric names per bucket
    pub fn max_metrics_per_bucket(mut self, count: usize) -> Self {
        self.config.store.max_metrics_per_bucket = count;
        self
    }

    /// Set overflow policy for the inner tiers
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.config.store.overflow = policy;
        self
    }

    /// Set number of synthetic writers
    pub fn writers(mut self, count: usize) -> Self {
        self.config.load.writers = count;
        self
    }

    /// Set number of distinct synthetic tag values
    pub fn tag_cardinality(mut self, count: usize) -> Self {
        self.config.load.tag_cardinality = count;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

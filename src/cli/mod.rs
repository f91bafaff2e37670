//! Command-line interface for memmetric.
//!
//! Runs a synthetic concurrent workload against a fresh store and prints
//! the aggregated snapshot as JSON.

use crate::core::config::ConfigBuilder;
use crate::core::{Config, MetricError, Result};
use crate::instrument::Recorder;
use crate::metrics::{Snapshot, Storage, Tags, TimeWindowIndex};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// In-memory metrics aggregation with a synthetic load generator
#[derive(Parser, Debug)]
#[command(name = "memmetric")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/memmetric/config.yaml)
    #[arg(short, long, env = "MEMMETRIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of concurrent writers
    #[arg(long, env = "MEMMETRIC_WRITERS")]
    pub writers: Option<usize>,

    /// Number of distinct tag values writers are spread over
    #[arg(long)]
    pub tag_cardinality: Option<usize>,

    /// Maximum live one-second buckets
    #[arg(long, env = "MEMMETRIC_MAX_TIME_BUCKETS")]
    pub max_time_buckets: Option<usize>,

    /// Enable debug logging
    #[arg(short, long, env = "MEMMETRIC_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// Print the snapshot on a single line
    #[arg(long)]
    pub compact: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = if let Some(path) = &self.config {
            path.clone()
        } else {
            let default_path = dirs::config_dir()
                .map(|d| d.join("memmetric").join("config.yaml"))
                .unwrap_or_else(|| PathBuf::from("~/.config/memmetric/config.yaml"));

            if default_path.exists() {
                default_path
            } else {
                return self.build_config_from_args(builder);
            }
        };

        match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                builder = builder.from_yaml(&content)?;
                tracing::info!("Loaded configuration from: {:?}", config_path);
            },
            Err(e) if self.config.is_some() => {
                // Explicitly requested file must exist
                return Err(MetricError::config(format!(
                    "Failed to read config file {:?}: {}",
                    config_path, e
                )));
            },
            Err(_) => {
                tracing::debug!("No config file found at {:?}, using defaults", config_path);
            },
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(writers) = self.writers {
            builder = builder.writers(writers);
        }
        if let Some(cardinality) = self.tag_cardinality {
            builder = builder.tag_cardinality(cardinality);
        }
        if let Some(max) = self.max_time_buckets {
            builder = builder.max_time_buckets(max);
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let log_level = if self.debug || config.debug {
            "debug"
        } else {
            config.logging.level.as_str()
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        // Logs go to stderr so stdout carries only the snapshot
        let fmt_layer = if config.logging.structured {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| MetricError::logging(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the memmetric command.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;
    cli.init_logging(&config)?;

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Max time buckets: {}", config.store.max_time_buckets);
        println!("  Max points per series: {}", config.store.max_points_per_series);
        println!("  Max metrics per bucket: {}", config.store.max_metrics_per_bucket);
        println!("  Overflow policy: {:?}", config.store.overflow);
        return Ok(());
    }

    let store = Arc::new(TimeWindowIndex::new(config.store));
    let recorder = Recorder::new(Arc::clone(&store) as Arc<dyn Storage>);

    let started = Instant::now();
    run_workload(&recorder, &config);
    let elapsed = started.elapsed();

    let stats = store.stats();
    tracing::info!(
        writers = config.load.writers,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        live_buckets = stats.live_buckets,
        inserted = stats.points_inserted,
        merged = stats.points_merged,
        dropped = stats.points_dropped,
        evicted = stats.buckets_evicted,
        "Workload finished"
    );

    let snapshot = Snapshot::capture(store.as_ref());
    println!("{}", snapshot.to_json(!cli.compact)?);
    Ok(())
}

/// Each writer records one count under `count` and one timing under `timer`,
/// tagged by its index modulo the configured cardinality.
pub fn run_workload(recorder: &Recorder, config: &Config) {
    let cardinality = config.load.tag_cardinality.max(1);
    let timer_value = config.load.timer_value_ms;

    (0..config.load.writers).into_par_iter().for_each(|i| {
        let id = (i % cardinality).to_string();
        recorder.count("count", Tags::from([("tag1", id.as_str())]), 1);

        let timer = recorder
            .new_timer("timer")
            .with_tag("tag1", id)
            .with_tag("tag2", "2");
        timer.value(timer_value);
    });
}

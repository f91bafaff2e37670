use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid capacity for {field}: must be greater than 0")]
    InvalidCapacity { field: &'static str },

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for memmetric operations
pub type Result<T> = std::result::Result<T, MetricError>;

impl MetricError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new logging setup error
    pub fn logging<S: Into<String>>(msg: S) -> Self {
        Self::Logging(msg.into())
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::InvalidCapacity { .. } => "config",
            Self::Logging(_) => "logging",
            Self::Io(_) => "io",
            Self::Serialization(_) | Self::Yaml(_) => "serialization",
        }
    }
}

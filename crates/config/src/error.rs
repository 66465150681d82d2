//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not match the expected shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The file parsed but is structurally invalid
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

impl ConfigError {
    /// Create a structural-validation error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

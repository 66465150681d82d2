//! Weir Configuration
//!
//! YAML-based configuration loading with sensible defaults. A pipelines file
//! maps pipeline names to pipeline blocks; a separate server file configures
//! the control API.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use weir_config::PipelinesConfig;
//! use std::str::FromStr;
//!
//! let config = PipelinesConfig::from_str(
//!     "entry:\n  source:\n    random:\n  sink:\n    - stdout:\n",
//! )
//! .unwrap();
//! assert_eq!(config.len(), 1);
//! ```
//!
//! # Example Pipelines File
//!
//! ```yaml
//! entry-pipeline:
//!   workers: 4
//!   delay: 1000
//!   source:
//!     random:
//!   buffer:
//!     bounded_blocking:
//!       buffer_size: 1024
//!       batch_size: 16
//!   processor:
//!     - string_converter:
//!         upper_case: true
//!   sink:
//!     - stdout:
//!     - downstream-pipeline:
//! downstream-pipeline:
//!   source:
//!     entry-pipeline:
//!   sink:
//!     - file:
//!         path: out/records.txt
//! ```
//!
//! A sink entry naming another pipeline becomes an inter-pipeline connector;
//! the named pipeline's source must name this pipeline back.

mod error;
mod pipeline;
mod server;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use pipeline::{PipelineDefinition, PluginBlock, DEFAULT_DELAY_MILLIS, DEFAULT_WORKERS};
pub use server::{MetricsRegistry, ServerConfig, DEFAULT_SERVER_PORT};

/// Top-level pipelines file: a mapping from pipeline name to pipeline block
///
/// Declaration order is preserved; it is the tiebreaker when the pipeline
/// graph admits more than one valid startup order.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PipelinesConfig {
    pipelines: IndexMap<String, PipelineDefinition>,
}

impl PipelinesConfig {
    /// Load a pipelines file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid YAML, or
    /// fails structural validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: PipelinesConfig = serde_yaml::from_str(s)?;
        validation::validate_pipelines(&config)?;
        Ok(config)
    }

    /// Look up a pipeline block by name
    pub fn get(&self, name: &str) -> Option<&PipelineDefinition> {
        self.pipelines.get(name)
    }

    /// Iterate pipelines in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PipelineDefinition)> {
        self.pipelines.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Pipeline names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.pipelines.keys().map(String::as_str).collect()
    }

    /// Whether a pipeline with this name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    /// Number of declared pipelines
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Whether the file declared no pipelines
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

impl FromStr for PipelinesConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

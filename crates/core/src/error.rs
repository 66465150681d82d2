//! Core error types
//!
//! Parse errors are fatal: no pipeline starts when any pipeline fails to
//! build. Start errors mark the failing pipeline stopped; the manager tears
//! down whatever had already started.

use thiserror::Error;
use weir_model::{PluginError, SourceError};

/// Errors raised while building pipelines from configuration
#[derive(Debug, Error)]
pub enum ParseError {
    /// A named plugin could not be resolved or constructed
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The pipeline graph or a pipeline block is invalid
    #[error("invalid configuration: pipeline '{pipeline}': {reason}")]
    InvalidConfiguration { pipeline: String, reason: String },

    /// The connector graph contains a cycle
    #[error("invalid configuration: cycle detected among pipelines {pipelines:?}")]
    CycleDetected { pipelines: Vec<String> },
}

impl ParseError {
    /// Create an invalid-configuration error for the named pipeline
    pub fn invalid(pipeline: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            pipeline: pipeline.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while starting pipelines
#[derive(Debug, Error)]
pub enum StartError {
    /// `start` was called on a pipeline that is not freshly created
    #[error("pipeline '{pipeline}' has already been started")]
    AlreadyStarted { pipeline: String },

    /// The pipeline's source failed to begin producing
    #[error("pipeline '{pipeline}' source failed to start: {source}")]
    Source {
        pipeline: String,
        #[source]
        source: SourceError,
    },
}

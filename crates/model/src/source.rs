//! Source contract
//!
//! A source produces records into its pipeline's buffer. Active sources spawn
//! a producing task from `start` and hand back its join handle so the runtime
//! can observe crashes; passive sources (pipeline connectors, which are fed by
//! an upstream pipeline) return no task.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::buffer::{Buffer, BufferError};

/// Errors raised by sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not begin producing
    #[error("source '{source_name}' failed to start: {reason}")]
    StartFailed { source_name: String, reason: String },

    /// The producing task failed mid-run
    #[error("source '{source_name}' failed: {reason}")]
    Failed { source_name: String, reason: String },

    /// The buffer rejected a write in a way the source cannot recover from
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// I/O failure while producing
    #[error("source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Create a start-failure error
    pub fn start_failed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StartFailed {
            source_name: source.into(),
            reason: reason.into(),
        }
    }

    /// Create a mid-run failure error
    pub fn failed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            source_name: source.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Join handle of an active source's producing task
///
/// `None` for passive sources. A task resolving to `Err` (or panicking) is a
/// source crash; the owning pipeline is transitioned to stopped and the
/// failure recorded, while other pipelines continue.
pub type SourceTask = Option<JoinHandle<SourceResult<()>>>;

/// Record producer feeding a pipeline's buffer
#[async_trait]
pub trait Source: Send + Sync {
    /// Begin producing into `buffer`
    ///
    /// Must not block for the lifetime of the source: long-running production
    /// happens on the returned task. Errors returned directly abort pipeline
    /// startup.
    async fn start(&self, buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask>;

    /// Request cessation
    ///
    /// Idempotent and safe to call concurrently. The source may keep
    /// producing for a bounded grace window after stop.
    fn stop(&self);
}

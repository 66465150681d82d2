//! Sink contract
//!
//! A sink delivers a processed batch externally. Retry discipline belongs to
//! the sink itself; the worker treats any return, success or error, as "batch
//! handled" and checkpoints so the buffer's capacity is released either way.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Record;

/// Errors raised by sinks
#[derive(Debug, Error)]
pub enum SinkError {
    /// Delivery failed after the sink's own retry discipline
    #[error("sink '{sink}' failed to deliver batch: {reason}")]
    DeliveryFailed { sink: String, reason: String },

    /// The sink has been shut down and refuses further batches
    #[error("sink '{sink}' is stopped and cannot accept records")]
    Stopped { sink: String },

    /// I/O failure while writing
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Create a delivery-failure error
    pub fn delivery(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            sink: sink.into(),
            reason: reason.into(),
        }
    }

    /// Create a stopped error
    pub fn stopped(sink: impl Into<String>) -> Self {
        Self::Stopped { sink: sink.into() }
    }
}

/// Result type for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Terminal stage delivering records externally
#[async_trait]
pub trait Sink: Send + Sync {
    /// Deliver a batch
    ///
    /// May block on the sink's own retries. Each sink in a pipeline's fan-out
    /// receives the same batch.
    async fn output(&self, records: &[Record]) -> SinkResult<()>;

    /// Release resources during pipeline shutdown
    ///
    /// Called once after the pipeline's workers have drained. Default is a
    /// no-op for sinks without buffered state.
    async fn shutdown(&self) {}
}

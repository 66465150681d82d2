//! Processor contract
//!
//! A processor is a batch transformation stage: input collection in, output
//! collection out. It may shrink, grow, or replace records. Processors must
//! not block on external I/O without their own deadlines; a failing processor
//! drops the batch (the worker logs and checkpoints so backpressure clears).

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Record;

/// Errors raised by processors
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The processor could not transform the batch
    #[error("processor '{processor}' failed: {reason}")]
    ExecutionFailed { processor: String, reason: String },
}

impl ProcessorError {
    /// Create an execution-failure error
    pub fn execution(processor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            processor: processor.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for processor operations
pub type ProcessorResult<T> = std::result::Result<T, ProcessorError>;

/// Batch transformation stage
#[async_trait]
pub trait Processor: Send + Sync {
    /// Transform a batch, substituting the result for the input
    async fn execute(&self, records: Vec<Record>) -> ProcessorResult<Vec<Record>>;

    /// Name used in logs when the processor fails
    fn name(&self) -> &str;
}

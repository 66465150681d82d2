//! Buffer contract
//!
//! A buffer is the bounded in-memory queue separating a pipeline's source from
//! its workers. Capacity is reserved when a record is written and released
//! only when the batch containing it is checkpointed, so backpressure holds
//! until the sinks have confirmed delivery.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::checkpoint::CheckpointState;
use crate::record::Record;

/// Errors raised by buffer writes
#[derive(Debug, Error)]
pub enum BufferError {
    /// No slot became available within the deadline
    #[error("pipeline [{pipeline}]: buffer is full, timed out waiting for a slot")]
    Timeout { pipeline: String },

    /// A bulk write exceeds total buffer capacity and can never succeed
    #[error(
        "pipeline [{pipeline}]: batch of {size} records exceeds buffer capacity {capacity}"
    )]
    SizeOverflow {
        pipeline: String,
        size: usize,
        capacity: usize,
    },
}

impl BufferError {
    /// Create a timeout error for the named pipeline
    pub fn timeout(pipeline: impl Into<String>) -> Self {
        Self::Timeout {
            pipeline: pipeline.into(),
        }
    }

    /// Create a size-overflow error for the named pipeline
    pub fn size_overflow(pipeline: impl Into<String>, size: usize, capacity: usize) -> Self {
        Self::SizeOverflow {
            pipeline: pipeline.into(),
            size,
            capacity,
        }
    }
}

/// Result type for buffer operations
pub type BufferResult<T> = std::result::Result<T, BufferError>;

/// Bounded queue between a source and the pipeline workers
///
/// # Contract
///
/// - Records written between start and stop appear in exactly one read batch.
/// - `read` never blocks materially longer than its timeout.
/// - Capacity reserved by `write`/`write_all` is released only by
///   [`checkpoint`](Buffer::checkpoint), never by `read`.
/// - [`is_empty`](Buffer::is_empty) is true only when the queue holds no
///   records and no read batch remains un-checkpointed.
#[async_trait]
pub trait Buffer: Send + Sync {
    /// Enqueue one record, waiting up to `timeout` for a slot
    async fn write(&self, record: Record, timeout: Duration) -> BufferResult<()>;

    /// Atomically enqueue a batch of records
    ///
    /// Fails with [`BufferError::SizeOverflow`] when the batch exceeds total
    /// capacity, and with [`BufferError::Timeout`] when insufficient slots
    /// open within the deadline. Either all records become visible or none do.
    async fn write_all(&self, records: Vec<Record>, timeout: Duration) -> BufferResult<()>;

    /// Dequeue a batch of up to the configured batch size
    ///
    /// May return a short (including empty) batch when the deadline elapses.
    /// The returned [`CheckpointState`] must eventually be passed back via
    /// [`checkpoint`](Buffer::checkpoint) to release the batch's capacity.
    async fn read(&self, timeout: Duration) -> (Vec<Record>, CheckpointState);

    /// Acknowledge downstream completion of a batch, releasing its capacity
    fn checkpoint(&self, state: CheckpointState);

    /// True only when the queue is empty and no records are in flight
    fn is_empty(&self) -> bool;
}

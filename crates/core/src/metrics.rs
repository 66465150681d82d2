//! Per-pipeline runtime metrics
//!
//! Lock-free counters updated by the worker loop, with a snapshot struct and
//! a cloneable handle that stays valid after the pipeline starts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for one pipeline's dataflow
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Non-empty batches pulled from the buffer
    batches_read: AtomicU64,

    /// Records pulled from the buffer
    records_read: AtomicU64,

    /// Records whose capacity has been returned to the buffer
    records_checkpointed: AtomicU64,

    /// Records handed to every sink
    records_delivered: AtomicU64,

    /// Batches dropped because a processor failed
    batches_dropped: AtomicU64,

    /// Sink deliveries that returned an error
    sink_errors: AtomicU64,
}

impl PipelineMetrics {
    /// Create a zeroed metrics instance
    pub const fn new() -> Self {
        Self {
            batches_read: AtomicU64::new(0),
            records_read: AtomicU64::new(0),
            records_checkpointed: AtomicU64::new(0),
            records_delivered: AtomicU64::new(0),
            batches_dropped: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
        }
    }

    /// Record a non-empty batch read of `records` records
    #[inline]
    pub fn record_batch_read(&self, records: u64) {
        self.batches_read.fetch_add(1, Ordering::Relaxed);
        self.records_read.fetch_add(records, Ordering::Relaxed);
    }

    /// Record a checkpoint covering `records` records
    #[inline]
    pub fn record_checkpoint(&self, records: u64) {
        self.records_checkpointed.fetch_add(records, Ordering::Relaxed);
    }

    /// Record delivery of `records` records to the full sink fan-out
    #[inline]
    pub fn record_delivered(&self, records: u64) {
        self.records_delivered.fetch_add(records, Ordering::Relaxed);
    }

    /// Record a batch dropped by a failing processor
    #[inline]
    pub fn record_batch_dropped(&self) {
        self.batches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed sink delivery
    #[inline]
    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of all counters
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        let records_read = self.records_read.load(Ordering::Relaxed);
        let records_checkpointed = self.records_checkpointed.load(Ordering::Relaxed);
        PipelineMetricsSnapshot {
            batches_read: self.batches_read.load(Ordering::Relaxed),
            records_read,
            records_checkpointed,
            records_delivered: self.records_delivered.load(Ordering::Relaxed),
            batches_dropped: self.batches_dropped.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            records_in_flight: records_read.saturating_sub(records_checkpointed),
        }
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineMetricsSnapshot {
    pub batches_read: u64,
    pub records_read: u64,
    pub records_checkpointed: u64,
    pub records_delivered: u64,
    pub batches_dropped: u64,
    pub sink_errors: u64,
    pub records_in_flight: u64,
}

/// Handle for reading one pipeline's metrics externally
///
/// Holds an `Arc` to the counters, so it remains valid for the life of the
/// process regardless of pipeline state.
#[derive(Clone)]
pub struct PipelineMetricsHandle {
    pipeline: String,
    metrics: Arc<PipelineMetrics>,
}

impl PipelineMetricsHandle {
    pub(crate) fn new(pipeline: impl Into<String>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            pipeline: pipeline.into(),
            metrics,
        }
    }

    /// The owning pipeline's name
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// Snapshot the counters
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_is_read_minus_checkpointed() {
        let metrics = PipelineMetrics::new();
        metrics.record_batch_read(8);
        metrics.record_batch_read(4);
        metrics.record_checkpoint(8);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_read, 2);
        assert_eq!(snapshot.records_read, 12);
        assert_eq!(snapshot.records_in_flight, 4);
    }

    #[test]
    fn test_handle_survives_independent_of_owner() {
        let metrics = Arc::new(PipelineMetrics::new());
        let handle = PipelineMetricsHandle::new("entry", Arc::clone(&metrics));
        drop(metrics);

        handle.metrics.record_batch_dropped();
        assert_eq!(handle.snapshot().batches_dropped, 1);
        assert_eq!(handle.pipeline(), "entry");
    }
}

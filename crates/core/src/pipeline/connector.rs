//! PipelineConnector - dual-role plugin linking two pipelines
//!
//! A connector is simultaneously the sink of one pipeline (the *sink
//! pipeline*, which writes into it) and the source of another (the *source
//! pipeline*, which reads out of it). The source face is passive: it only
//! records the downstream buffer. The sink face is active: it writes each
//! batch record-by-record into that buffer, retrying a full buffer forever so
//! that backpressure from a slow downstream pipeline stalls its upstream
//! rather than dropping records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use weir_model::{
    Buffer, Record, Sink, SinkError, SinkResult, Source, SourceResult, SourceTask,
};

/// Per-attempt write timeout; attempts repeat until the write lands, so the
/// effective timeout is unbounded and this only sets how often the retry loop
/// logs and re-checks the stop latch.
const WRITE_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Dual-role node linking one pipeline's sink side to another's source side
///
/// Both pipeline names are populated by the pipeline parser before either
/// pipeline starts, and the downstream buffer is bound at parse time so the
/// link holds regardless of pipeline start order.
pub struct PipelineConnector {
    /// Pipeline this connector acts as sink for (the upstream writer)
    sink_pipeline: RwLock<String>,

    /// Pipeline this connector acts as source for (the downstream reader)
    source_pipeline: RwLock<String>,

    /// The downstream pipeline's buffer
    buffer: RwLock<Option<Arc<dyn Buffer>>>,

    /// Latch tripped by `stop`/`shutdown`; output refuses records once set
    stop_requested: AtomicBool,
}

impl PipelineConnector {
    /// Create an unbound connector
    pub fn new() -> Self {
        Self {
            sink_pipeline: RwLock::new(String::new()),
            source_pipeline: RwLock::new(String::new()),
            buffer: RwLock::new(None),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Record the upstream pipeline writing into this connector
    pub fn set_sink_pipeline(&self, name: impl Into<String>) {
        *self.sink_pipeline.write() = name.into();
    }

    /// Record the downstream pipeline reading out of this connector
    pub fn set_source_pipeline(&self, name: impl Into<String>) {
        *self.source_pipeline.write() = name.into();
    }

    /// Bind the downstream pipeline's buffer
    ///
    /// Called by the parser when the downstream pipeline is materialised, so
    /// an upstream pipeline that starts first can already deliver.
    pub fn bind_buffer(&self, buffer: Arc<dyn Buffer>) {
        *self.buffer.write() = Some(buffer);
    }

    /// `sink-pipeline → source-pipeline` label for logs
    fn label(&self) -> String {
        format!(
            "{}-{}",
            self.sink_pipeline.read(),
            self.source_pipeline.read()
        )
    }
}

impl Default for PipelineConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for PipelineConnector {
    /// Passive producer: records arrive through the sink face, so starting
    /// only (re-)records the buffer reference and spawns nothing.
    async fn start(&self, buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask> {
        self.bind_buffer(buffer);
        Ok(None)
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Sink for PipelineConnector {
    async fn output(&self, records: &[Record]) -> SinkResult<()> {
        let buffer = self.buffer.read().clone();
        let Some(buffer) = buffer else {
            return Err(SinkError::delivery(
                self.label(),
                "downstream pipeline is not initialized",
            ));
        };
        if self.stop_requested.load(Ordering::SeqCst) {
            // Upstream is being torn down; refusing is fatal for this batch.
            return Err(SinkError::stopped(self.label()));
        }

        for record in records {
            loop {
                match buffer.write(record.clone(), WRITE_RETRY_INTERVAL).await {
                    Ok(()) => break,
                    Err(e) => {
                        // A stalled retry must still observe teardown, or the
                        // upstream worker would hang in a dead connector.
                        if self.stop_requested.load(Ordering::SeqCst) {
                            return Err(SinkError::stopped(self.label()));
                        }
                        tracing::warn!(
                            connector = %self.label(),
                            error = %e,
                            "downstream buffer is full, retrying"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    async fn shutdown(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        *self.buffer.write() = None;
    }
}

#[cfg(test)]
#[path = "connector_test.rs"]
mod tests;

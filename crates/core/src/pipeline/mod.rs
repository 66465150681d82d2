//! Pipeline - one source, one buffer, a processor chain, and sink fan-out
//!
//! A pipeline owns its components and a pool of worker tasks. Each worker
//! pulls a batch from the buffer, runs it through the processor chain, hands
//! the result to every sink, and checkpoints the batch unconditionally so
//! buffer capacity is released even when a stage failed.
//!
//! # Lifecycle
//!
//! ```text
//! Created --start()--> Started --stop()--> Stopping --drained--> Stopped
//! ```
//!
//! `stop` requests source cessation, then lets the workers drain the buffer
//! under a bounded deadline before shutting sinks down. Workers that are
//! stuck in a sink past the deadline are aborted with a warning; the pipeline
//! still reaches `Stopped`.
//!
//! # Ordering
//!
//! Records are read from the buffer in FIFO order, but workers process
//! batches concurrently, so sinks may observe inter-batch reordering. A
//! deployment that needs total order must configure `workers: 1`.

mod connector;

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use weir_model::{Buffer, Processor, Record, Sink, Source, SourceError};

use crate::error::StartError;
use crate::metrics::{PipelineMetrics, PipelineMetricsHandle};

pub use connector::PipelineConnector;

/// Default bound on how long `stop` waits for workers to drain the buffer
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Grace given to a worker after the drain deadline before it is aborted
const WORKER_ABORT_GRACE: Duration = Duration::from_millis(100);

/// How often the drain wait re-checks the buffer
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Pipeline lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineState {
    Created = 0,
    Started = 1,
    Stopping = 2,
    Stopped = 3,
}

impl PipelineState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Started,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Worker and timing configuration for one pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Parallel processor+sink workers
    pub workers: usize,

    /// How long a worker read waits for a full batch
    pub read_timeout: Duration,

    /// Sleep between empty reads; zero skips the sleep
    pub delay: Duration,

    /// Bound on draining the buffer during `stop`
    pub drain_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            read_timeout: Duration::from_millis(3000),
            delay: Duration::from_millis(3000),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

/// One dataflow: source → buffer → processor chain → sink fan-out
pub struct Pipeline {
    name: String,
    source: Arc<dyn Source>,
    buffer: Arc<dyn Buffer>,
    processors: Vec<Box<dyn Processor>>,
    sinks: Vec<Arc<dyn Sink>>,
    settings: PipelineSettings,

    state: AtomicU8,
    failed: AtomicBool,
    shutdown: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<PipelineMetrics>,
}

impl Pipeline {
    /// Assemble a pipeline from its components
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn Source>,
        buffer: Arc<dyn Buffer>,
        processors: Vec<Box<dyn Processor>>,
        sinks: Vec<Arc<dyn Sink>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            buffer,
            processors,
            sinks,
            settings,
            state: AtomicU8::new(PipelineState::Created as u8),
            failed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Pipeline name, unique across the process
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Whether the pipeline is in the `Started` state
    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Started
    }

    /// Whether the pipeline was stopped by a source crash
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// The pipeline's buffer
    pub fn buffer(&self) -> &Arc<dyn Buffer> {
        &self.buffer
    }

    /// Handle for reading this pipeline's metrics
    pub fn metrics_handle(&self) -> PipelineMetricsHandle {
        PipelineMetricsHandle::new(self.name.as_str(), Arc::clone(&self.metrics))
    }

    fn stop_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Start the source and launch the worker pool
    ///
    /// A source that fails to start leaves the pipeline `Stopped` and aborts
    /// startup; the caller decides whether to tear down sibling pipelines.
    pub async fn start(self: Arc<Self>) -> Result<(), StartError> {
        let created = PipelineState::Created as u8;
        let started = PipelineState::Started as u8;
        if self
            .state
            .compare_exchange(created, started, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(StartError::AlreadyStarted {
                pipeline: self.name.clone(),
            });
        }

        tracing::info!(
            pipeline = %self.name,
            workers = self.settings.workers,
            processors = self.processors.len(),
            sinks = self.sinks.len(),
            "starting pipeline"
        );

        let source_task = match self.source.start(Arc::clone(&self.buffer)).await {
            Ok(task) => task,
            Err(e) => {
                self.state
                    .store(PipelineState::Stopped as u8, Ordering::SeqCst);
                self.failed.store(true, Ordering::SeqCst);
                return Err(StartError::Source {
                    pipeline: self.name.clone(),
                    source: e,
                });
            }
        };

        if let Some(handle) = source_task {
            let pipeline = Arc::clone(&self);
            tokio::spawn(async move {
                pipeline.watch_source(handle).await;
            });
        }

        let mut workers = self.workers.lock();
        for worker_id in 0..self.settings.workers {
            let pipeline = Arc::clone(&self);
            workers.push(tokio::spawn(async move {
                pipeline.worker_loop(worker_id).await;
            }));
        }
        drop(workers);

        Ok(())
    }

    /// Watch an active source's producing task and escalate crashes
    async fn watch_source(self: Arc<Self>, handle: JoinHandle<Result<(), SourceError>>) {
        let failure = match handle.await {
            Ok(Ok(())) => {
                tracing::debug!(pipeline = %self.name, "source task completed");
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) if e.is_cancelled() => return,
            Err(e) => format!("source task panicked: {e}"),
        };

        tracing::error!(
            pipeline = %self.name,
            error = %failure,
            "source crashed, stopping pipeline"
        );
        self.failed.store(true, Ordering::SeqCst);
        self.stop().await;
    }

    /// The worker loop: read → process → fan out → checkpoint
    async fn worker_loop(self: Arc<Self>, worker_id: usize) {
        tracing::debug!(pipeline = %self.name, worker_id, "worker starting");

        loop {
            let (records, checkpoint) = self.buffer.read(self.settings.read_timeout).await;

            if records.is_empty() {
                if self.stop_requested() && self.buffer.is_empty() {
                    break;
                }
                self.idle_between_reads().await;
                continue;
            }

            self.metrics.record_batch_read(records.len() as u64);
            let released = checkpoint.records_to_check() as u64;

            if let Some(batch) = self.run_processors(records).await
                && !batch.is_empty()
            {
                self.deliver(&batch).await;
            }

            // Checkpoint whether or not the batch survived: a failed batch
            // must not keep holding buffer capacity.
            self.buffer.checkpoint(checkpoint);
            self.metrics.record_checkpoint(released);

            if self.stop_requested() && self.buffer.is_empty() {
                break;
            }
        }

        tracing::debug!(pipeline = %self.name, worker_id, "worker stopping");
    }

    /// Sleep the configured delay after an empty read, waking early on stop
    async fn idle_between_reads(&self) {
        if self.settings.delay.is_zero() || self.stop_requested() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.settings.delay) => {}
            _ = self.shutdown.cancelled() => {}
        }
    }

    /// Run the processor chain; a failing processor drops the batch
    async fn run_processors(&self, records: Vec<Record>) -> Option<Vec<Record>> {
        let mut batch = records;
        for processor in &self.processors {
            match processor.execute(batch).await {
                Ok(next) => batch = next,
                Err(e) => {
                    tracing::warn!(
                        pipeline = %self.name,
                        processor = processor.name(),
                        error = %e,
                        "processor failed, dropping batch"
                    );
                    self.metrics.record_batch_dropped();
                    return None;
                }
            }
        }
        Some(batch)
    }

    /// Hand the batch to every sink; failures are logged and swallowed
    async fn deliver(&self, batch: &[Record]) {
        for sink in &self.sinks {
            if let Err(e) = sink.output(batch).await {
                tracing::error!(
                    pipeline = %self.name,
                    error = %e,
                    "sink failed to deliver batch"
                );
                self.metrics.record_sink_error();
            }
        }
        self.metrics.record_delivered(batch.len() as u64);
    }

    /// Stop the pipeline: stop the source, drain, shut sinks down
    ///
    /// Idempotent; concurrent and repeat calls return without re-running the
    /// teardown. Returns once the pipeline is `Stopped` or the drain deadline
    /// has been abandoned.
    pub async fn stop(&self) {
        let started = PipelineState::Started as u8;
        let stopping = PipelineState::Stopping as u8;
        match self
            .state
            .compare_exchange(started, stopping, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {}
            Err(current) => {
                // Never started: nothing to drain.
                if current == PipelineState::Created as u8 {
                    self.state
                        .store(PipelineState::Stopped as u8, Ordering::SeqCst);
                }
                return;
            }
        }

        tracing::info!(pipeline = %self.name, "stopping pipeline");
        self.source.stop();
        self.shutdown.cancel();

        let deadline = Instant::now() + self.settings.drain_timeout;
        while !self.buffer.is_empty() && Instant::now() < deadline {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
        if !self.buffer.is_empty() {
            tracing::warn!(
                pipeline = %self.name,
                "drain deadline elapsed with records still buffered or in flight"
            );
        }

        let workers: Vec<JoinHandle<()>> = {
            let mut guard = self.workers.lock();
            guard.drain(..).collect()
        };
        for mut handle in workers {
            let remaining = deadline
                .saturating_duration_since(Instant::now())
                .max(WORKER_ABORT_GRACE);
            if tokio::time::timeout(remaining, &mut handle).await.is_err() {
                tracing::warn!(
                    pipeline = %self.name,
                    "worker did not exit before the drain deadline, aborting"
                );
                handle.abort();
            }
        }

        for sink in &self.sinks {
            sink.shutdown().await;
        }

        self.state
            .store(PipelineState::Stopped as u8, Ordering::SeqCst);
        let snapshot = self.metrics.snapshot();
        tracing::info!(
            pipeline = %self.name,
            records_read = snapshot.records_read,
            records_delivered = snapshot.records_delivered,
            batches_dropped = snapshot.batches_dropped,
            sink_errors = snapshot.sink_errors,
            "pipeline stopped"
        );
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("workers", &self.settings.workers)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

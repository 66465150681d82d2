//! Bounded blocking buffer
//!
//! A FIFO queue of fixed capacity gated by a semaphore of the same size.
//! Writes acquire permits; reads dequeue without releasing them; permits are
//! returned only by `checkpoint`. The tracked in-flight count is therefore
//! `acquired - checkpointed`, and `is_empty` holds only when both the queue
//! and the in-flight count are zero.
//!
//! # Read policy
//!
//! `read` collects up to `batch_size` records against a monotonic deadline:
//! one wait for the first record (or the deadline), then a non-blocking drain,
//! repeated while the deadline remains and the batch is short. This amortises
//! the per-record wakeup cost under steady load while keeping latency bounded
//! under light load.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};
use tokio::time::Instant;

use weir_model::{
    Buffer, BufferError, BufferResult, CheckpointState, PluginError, PluginResult, PluginSetting,
    Record,
};

use crate::registry::BufferFactory;

/// Registry key for the bounded blocking buffer
pub const PLUGIN_NAME: &str = "bounded_blocking";

/// Default queue capacity when `buffer_size` is not configured
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Default read batch size when `batch_size` is not configured
pub const DEFAULT_BATCH_SIZE: usize = 8;

const ATTRIBUTE_BUFFER_CAPACITY: &str = "buffer_size";
const ATTRIBUTE_BATCH_SIZE: &str = "batch_size";

/// Bounded in-memory FIFO buffer with checkpoint-released capacity
pub struct BlockingBuffer {
    capacity: usize,
    batch_size: usize,
    pipeline_name: String,

    /// FIFO queue; the lock is held only for push/pop, never across awaits
    queue: Mutex<VecDeque<Record>>,

    /// One permit per free slot; writes forget permits, checkpoint re-adds them
    permits: Semaphore,

    /// Wakes readers when records land
    available: Notify,

    /// Records handed to workers but not yet checkpointed
    in_flight: AtomicUsize,
}

impl BlockingBuffer {
    /// Create a buffer with the given fixed capacity and read batch size
    pub fn new(capacity: usize, batch_size: usize, pipeline_name: impl Into<String>) -> Self {
        Self {
            capacity,
            batch_size,
            pipeline_name: pipeline_name.into(),
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            permits: Semaphore::new(capacity),
            available: Notify::new(),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Construct from a plugin setting, applying defaults for absent options
    pub fn from_setting(setting: &PluginSetting) -> PluginResult<Self> {
        let capacity = setting.get_usize_or(ATTRIBUTE_BUFFER_CAPACITY, DEFAULT_BUFFER_CAPACITY)?;
        let batch_size = setting.get_usize_or(ATTRIBUTE_BATCH_SIZE, DEFAULT_BATCH_SIZE)?;
        if capacity == 0 {
            return Err(PluginError::invalid_setting(
                setting.name(),
                ATTRIBUTE_BUFFER_CAPACITY,
                "must be at least 1",
            ));
        }
        if batch_size == 0 {
            return Err(PluginError::invalid_setting(
                setting.name(),
                ATTRIBUTE_BATCH_SIZE,
                "must be at least 1",
            ));
        }
        let pipeline_name = setting.pipeline_name().unwrap_or_default().to_string();
        Ok(Self::new(capacity, batch_size, pipeline_name))
    }

    /// Total capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum records per read batch
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Records handed out by `read` and not yet checkpointed
    #[inline]
    pub fn records_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Move queued records into `records` until the batch is full
    fn drain_into(&self, records: &mut Vec<Record>) {
        let mut queue = self.queue.lock();
        while records.len() < self.batch_size {
            match queue.pop_front() {
                Some(record) => records.push(record),
                None => break,
            }
        }
    }
}

#[async_trait]
impl Buffer for BlockingBuffer {
    async fn write(&self, record: Record, timeout: Duration) -> BufferResult<()> {
        match tokio::time::timeout(timeout, self.permits.acquire()).await {
            Ok(Ok(permit)) => {
                // Ownership of the slot moves to the record; returned by checkpoint.
                permit.forget();
                self.queue.lock().push_back(record);
                self.available.notify_one();
                Ok(())
            }
            // A closed semaphore only happens during teardown; report it the
            // same way as a full buffer so sources recover locally.
            Ok(Err(_)) | Err(_) => Err(BufferError::timeout(&self.pipeline_name)),
        }
    }

    async fn write_all(&self, records: Vec<Record>, timeout: Duration) -> BufferResult<()> {
        let size = records.len();
        if size > self.capacity {
            return Err(BufferError::size_overflow(
                &self.pipeline_name,
                size,
                self.capacity,
            ));
        }
        if size == 0 {
            return Ok(());
        }
        match tokio::time::timeout(timeout, self.permits.acquire_many(size as u32)).await {
            Ok(Ok(permit)) => {
                permit.forget();
                self.queue.lock().extend(records);
                // More than one reader may be waiting on a bulk write.
                self.available.notify_waiters();
                self.available.notify_one();
                Ok(())
            }
            Ok(Err(_)) | Err(_) => Err(BufferError::timeout(&self.pipeline_name)),
        }
    }

    async fn read(&self, timeout: Duration) -> (Vec<Record>, CheckpointState) {
        let deadline = Instant::now() + timeout;
        let mut records = Vec::with_capacity(self.batch_size);

        loop {
            self.drain_into(&mut records);
            if records.len() >= self.batch_size {
                break;
            }

            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            // Re-check after arming the waiter: a write between the drain and
            // enable would otherwise be missed until the next notify.
            self.drain_into(&mut records);
            if records.len() >= self.batch_size {
                break;
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                // Deadline elapsed; pick up anything that landed meanwhile.
                self.drain_into(&mut records);
                break;
            }
        }

        if !records.is_empty() {
            self.in_flight.fetch_add(records.len(), Ordering::SeqCst);
        }
        let checkpoint = CheckpointState::new(records.len());
        (records, checkpoint)
    }

    fn checkpoint(&self, state: CheckpointState) {
        let released = state.records_to_check();
        if released == 0 {
            return;
        }
        self.in_flight.fetch_sub(released, Ordering::SeqCst);
        self.permits.add_permits(released);
    }

    fn is_empty(&self) -> bool {
        self.queue.lock().is_empty() && self.in_flight.load(Ordering::SeqCst) == 0
    }
}

/// Factory for the bounded blocking buffer
///
/// Registered under [`PLUGIN_NAME`] in every registry built by
/// `PluginRegistry::with_core_plugins`.
pub struct BlockingBufferFactory;

impl BufferFactory for BlockingBufferFactory {
    fn create(&self, setting: &PluginSetting) -> PluginResult<std::sync::Arc<dyn Buffer>> {
        Ok(std::sync::Arc::new(BlockingBuffer::from_setting(setting)?))
    }
}

#[cfg(test)]
#[path = "blocking_test.rs"]
mod tests;

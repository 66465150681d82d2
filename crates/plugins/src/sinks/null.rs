//! Null sink - discard all data
//!
//! Receives batches, counts them, and drops the data. Useful for measuring
//! pure pipeline throughput without a sink bottleneck, and for validating a
//! pipeline definition before wiring a real destination.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use weir_core::SinkFactory;
use weir_model::{PluginResult, PluginSetting, Record, Sink, SinkResult};

/// Registry key for the null sink
pub const PLUGIN_NAME: &str = "null";

/// Sink that counts and discards every batch
#[derive(Default)]
pub struct NullSink {
    batches_received: AtomicU64,
    records_received: AtomicU64,
}

impl NullSink {
    /// Create a null sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches received so far
    pub fn batches_received(&self) -> u64 {
        self.batches_received.load(Ordering::Relaxed)
    }

    /// Records received so far
    pub fn records_received(&self) -> u64 {
        self.records_received.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Sink for NullSink {
    async fn output(&self, records: &[Record]) -> SinkResult<()> {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
        self.records_received
            .fetch_add(records.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::debug!(
            batches = self.batches_received(),
            records = self.records_received(),
            "null sink shutting down"
        );
    }
}

/// Factory for [`NullSink`]
pub struct NullSinkFactory;

impl SinkFactory for NullSinkFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<std::sync::Arc<dyn Sink>> {
        Ok(std::sync::Arc::new(NullSink::new()))
    }
}

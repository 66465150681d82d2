//! Random source - UUID-string records on a fixed cadence
//!
//! Useful for smoke-testing a pipeline definition without wiring a real
//! ingress: each tick writes one random UUID string into the buffer until the
//! source is stopped. A full buffer is logged and retried on the next tick,
//! so a stalled pipeline shows up as backpressure rather than a crash.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use weir_core::SourceFactory;
use weir_model::{Buffer, PluginResult, PluginSetting, Record, Source, SourceResult, SourceTask};

/// Registry key for the random source
pub const PLUGIN_NAME: &str = "random";

const ATTRIBUTE_INTERVAL: &str = "interval";
const DEFAULT_INTERVAL_MILLIS: u64 = 500;
const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Source emitting one random UUID string per interval
pub struct RandomSource {
    interval: Duration,
    token: CancellationToken,
}

impl RandomSource {
    /// Create a source ticking at `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            token: CancellationToken::new(),
        }
    }

    /// Construct from a plugin setting
    pub fn from_setting(setting: &PluginSetting) -> PluginResult<Self> {
        let interval = setting.get_u64_or(ATTRIBUTE_INTERVAL, DEFAULT_INTERVAL_MILLIS)?;
        Ok(Self::new(Duration::from_millis(interval)))
    }
}

#[async_trait]
impl Source for RandomSource {
    async fn start(&self, buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask> {
        let interval = self.interval;
        let token = self.token.clone();

        let handle = tokio::spawn(async move {
            tracing::debug!(interval_ms = interval.as_millis() as u64, "random source producing");
            loop {
                let record = Record::from_string(Uuid::new_v4().to_string());
                if let Err(e) = buffer.write(record, WRITE_TIMEOUT).await {
                    tracing::debug!(error = %e, "buffer full, dropping tick");
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = token.cancelled() => break,
                }
            }
            tracing::debug!("random source stopped");
            Ok(())
        });

        Ok(Some(handle))
    }

    fn stop(&self) {
        self.token.cancel();
    }
}

/// Factory for [`RandomSource`]
pub struct RandomSourceFactory;

impl SourceFactory for RandomSourceFactory {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Source>> {
        Ok(Arc::new(RandomSource::from_setting(setting)?))
    }
}

#[cfg(test)]
#[path = "random_test.rs"]
mod tests;

//! File sink - line-per-record text file
//!
//! The file is opened lazily on the first batch so the factory never blocks
//! on I/O. Writes go through a buffered writer; the buffer is flushed on
//! every batch so records are durable once `output` returns, and again on
//! shutdown for good measure.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use weir_core::SinkFactory;
use weir_model::{PluginResult, PluginSetting, Record, Sink, SinkResult};

/// Registry key for the file sink
pub const PLUGIN_NAME: &str = "file";

const ATTRIBUTE_PATH: &str = "path";

/// Sink appending one line per record to a file
pub struct FileSink {
    path: String,
    writer: Mutex<Option<BufWriter<tokio::fs::File>>>,
}

impl FileSink {
    /// Create a sink writing to `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(None),
        }
    }

    /// Construct from a plugin setting; `path` is required
    pub fn from_setting(setting: &PluginSetting) -> PluginResult<Self> {
        Ok(Self::new(setting.require_str(ATTRIBUTE_PATH)?))
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn output(&self, records: &[Record]) -> SinkResult<()> {
        let mut guard = self.writer.lock().await;
        let writer = match guard.as_mut() {
            Some(writer) => writer,
            None => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .await?;
                guard.insert(BufWriter::new(file))
            }
        };

        for record in records {
            writer.write_all(record.to_string().as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        writer.flush().await?;
        Ok(())
    }

    async fn shutdown(&self) {
        let mut guard = self.writer.lock().await;
        if let Some(writer) = guard.as_mut()
            && let Err(e) = writer.flush().await
        {
            tracing::warn!(path = %self.path, error = %e, "failed to flush file sink");
        }
        *guard = None;
    }
}

/// Factory for [`FileSink`]
pub struct FileSinkFactory;

impl SinkFactory for FileSinkFactory {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Sink>> {
        Ok(Arc::new(FileSink::from_setting(setting)?))
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

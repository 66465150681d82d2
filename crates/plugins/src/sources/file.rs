//! File source - read a file line-by-line into string records
//!
//! The file is opened on the producing task, not in the factory, so a missing
//! path surfaces as a source crash rather than blocking configuration. The
//! task completes once the file is exhausted; the pipeline keeps running so
//! buffered records drain normally.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use weir_core::SourceFactory;
use weir_model::{Buffer, PluginResult, PluginSetting, Record, Source, SourceResult, SourceTask};

/// Registry key for the file source
pub const PLUGIN_NAME: &str = "file";

const ATTRIBUTE_PATH: &str = "path";
const ATTRIBUTE_WRITE_TIMEOUT: &str = "write_timeout";
const DEFAULT_WRITE_TIMEOUT_MILLIS: u64 = 5000;

/// Source reading one record per line from a file
pub struct FileSource {
    path: String,
    write_timeout: Duration,
    token: CancellationToken,
}

impl FileSource {
    /// Create a source over `path`
    pub fn new(path: impl Into<String>, write_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            write_timeout,
            token: CancellationToken::new(),
        }
    }

    /// Construct from a plugin setting; `path` is required
    pub fn from_setting(setting: &PluginSetting) -> PluginResult<Self> {
        let path = setting.require_str(ATTRIBUTE_PATH)?;
        let write_timeout =
            setting.get_u64_or(ATTRIBUTE_WRITE_TIMEOUT, DEFAULT_WRITE_TIMEOUT_MILLIS)?;
        Ok(Self::new(path, Duration::from_millis(write_timeout)))
    }
}

#[async_trait]
impl Source for FileSource {
    async fn start(&self, buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask> {
        let path = self.path.clone();
        let write_timeout = self.write_timeout;
        let token = self.token.clone();

        let handle = tokio::spawn(async move {
            let file = File::open(&path).await?;
            let mut lines = BufReader::new(file).lines();
            let mut written = 0u64;

            while let Some(line) = lines.next_line().await? {
                if token.is_cancelled() {
                    break;
                }
                buffer.write(Record::from_string(line), write_timeout).await?;
                written += 1;
            }

            tracing::info!(path = %path, records = written, "file source finished");
            Ok(())
        });

        Ok(Some(handle))
    }

    fn stop(&self) {
        self.token.cancel();
    }
}

/// Factory for [`FileSource`]
pub struct FileSourceFactory;

impl SourceFactory for FileSourceFactory {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Source>> {
        Ok(Arc::new(FileSource::from_setting(setting)?))
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

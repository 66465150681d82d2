//! Stdout sink - print records for debugging

use async_trait::async_trait;

use weir_core::SinkFactory;
use weir_model::{PluginResult, PluginSetting, Record, Sink, SinkResult};

/// Registry key for the stdout sink
pub const PLUGIN_NAME: &str = "stdout";

/// Sink printing one line per record
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    async fn output(&self, records: &[Record]) -> SinkResult<()> {
        for record in records {
            println!("{record}");
        }
        Ok(())
    }
}

/// Factory for [`StdoutSink`]
pub struct StdoutSinkFactory;

impl SinkFactory for StdoutSinkFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<std::sync::Arc<dyn Sink>> {
        Ok(std::sync::Arc::new(StdoutSink))
    }
}

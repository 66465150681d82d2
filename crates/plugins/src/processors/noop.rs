//! Noop processor - pass-through

use async_trait::async_trait;

use weir_core::ProcessorFactory;
use weir_model::{PluginResult, PluginSetting, Processor, ProcessorResult, Record};

/// Registry key for the noop processor
pub const PLUGIN_NAME: &str = "noop";

/// Processor that returns its input unchanged
pub struct NoopProcessor;

#[async_trait]
impl Processor for NoopProcessor {
    async fn execute(&self, records: Vec<Record>) -> ProcessorResult<Vec<Record>> {
        Ok(records)
    }

    fn name(&self) -> &str {
        PLUGIN_NAME
    }
}

/// Factory for [`NoopProcessor`]
pub struct NoopProcessorFactory;

impl ProcessorFactory for NoopProcessorFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<Box<dyn Processor>> {
        Ok(Box::new(NoopProcessor))
    }
}

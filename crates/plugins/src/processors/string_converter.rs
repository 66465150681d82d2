//! String converter processor - upper/lower-case string payloads
//!
//! Only string records are touched; byte and event payloads pass through
//! unchanged.

use async_trait::async_trait;

use weir_core::ProcessorFactory;
use weir_model::{PluginResult, PluginSetting, Processor, ProcessorResult, Record};

/// Registry key for the string converter processor
pub const PLUGIN_NAME: &str = "string_converter";

const ATTRIBUTE_UPPER_CASE: &str = "upper_case";
const DEFAULT_UPPER_CASE: bool = true;

/// Processor re-casing string payloads
pub struct StringConverter {
    upper_case: bool,
}

impl StringConverter {
    /// Create a converter; `upper_case: false` lower-cases instead
    pub fn new(upper_case: bool) -> Self {
        Self { upper_case }
    }

    /// Construct from a plugin setting
    pub fn from_setting(setting: &PluginSetting) -> PluginResult<Self> {
        let upper_case = setting.get_bool_or(ATTRIBUTE_UPPER_CASE, DEFAULT_UPPER_CASE)?;
        Ok(Self::new(upper_case))
    }
}

#[async_trait]
impl Processor for StringConverter {
    async fn execute(&self, records: Vec<Record>) -> ProcessorResult<Vec<Record>> {
        Ok(records
            .into_iter()
            .map(|record| match record.as_str() {
                Some(s) => {
                    let converted = if self.upper_case {
                        s.to_uppercase()
                    } else {
                        s.to_lowercase()
                    };
                    Record::from_string(converted)
                }
                None => record,
            })
            .collect())
    }

    fn name(&self) -> &str {
        PLUGIN_NAME
    }
}

/// Factory for [`StringConverter`]
pub struct StringConverterFactory;

impl ProcessorFactory for StringConverterFactory {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Box<dyn Processor>> {
        Ok(Box::new(StringConverter::from_setting(setting)?))
    }
}

#[cfg(test)]
#[path = "string_converter_test.rs"]
mod tests;

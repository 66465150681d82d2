//! Pipeline block and plugin block shapes
//!
//! A pipeline block has a `source` plugin block, an optional `buffer` block,
//! an ordered `processor` list, a non-empty `sink` list, and worker/delay
//! settings. A plugin block is a single-key map, `{ <plugin-name>:
//! <options-map> }`, where the plugin name is the registry key.

use std::time::Duration;

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::Value;
use weir_model::PluginSetting;

/// Default number of processor+sink workers per pipeline
pub const DEFAULT_WORKERS: usize = 1;

/// Default sleep between empty buffer reads, in milliseconds
pub const DEFAULT_DELAY_MILLIS: u64 = 3000;

/// Default worker read timeout, in milliseconds
pub const DEFAULT_READ_TIMEOUT_MILLIS: u64 = 3000;

/// One pipeline's configuration block
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDefinition {
    /// Source plugin
    pub source: PluginBlock,

    /// Buffer plugin; the runtime substitutes its default bounded blocking
    /// buffer when omitted
    #[serde(default)]
    pub buffer: Option<PluginBlock>,

    /// Ordered processor chain, applied to every batch
    #[serde(default)]
    pub processor: Vec<PluginBlock>,

    /// Sink plugins; every sink receives every batch
    #[serde(default)]
    pub sink: Vec<PluginBlock>,

    /// Parallel processor+sink workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Sleep between empty reads, in milliseconds
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Worker read timeout, in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout: u64,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_delay() -> u64 {
    DEFAULT_DELAY_MILLIS
}

fn default_read_timeout() -> u64 {
    DEFAULT_READ_TIMEOUT_MILLIS
}

impl PipelineDefinition {
    /// Delay between empty reads in milliseconds
    pub fn delay_millis(&self) -> u64 {
        self.delay
    }

    /// Delay between empty reads as a duration
    pub fn delay_duration(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    /// Worker read timeout as a duration
    pub fn read_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.read_timeout)
    }
}

/// A single plugin invocation: name plus option map
///
/// Deserialized from the `{ name: options }` single-key map shape. A null
/// options value (`stdout:`) is an empty option map.
#[derive(Debug, Clone)]
pub struct PluginBlock {
    name: String,
    options: IndexMap<String, Value>,
}

impl PluginBlock {
    /// Create a block with no options, e.g. for runtime-supplied defaults
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: IndexMap::new(),
        }
    }

    /// The plugin name (registry key, or target pipeline name for connectors)
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw option map
    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    /// Convert to the [`PluginSetting`] handed to plugin factories
    ///
    /// The pipeline name is populated by the pipeline parser before the
    /// setting reaches a factory.
    pub fn to_setting(&self) -> PluginSetting {
        PluginSetting::new(&self.name, self.options.clone())
    }
}

impl<'de> Deserialize<'de> for PluginBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = IndexMap::<String, Option<Value>>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(de::Error::custom(format!(
                "a plugin block must be a single-key map of plugin name to options, got {} keys",
                map.len()
            )));
        }
        let (name, options) = map.swap_remove_index(0).unwrap_or_default();
        if name.is_empty() {
            return Err(de::Error::custom("plugin name must be non-empty"));
        }

        let options = match options {
            None | Some(Value::Null) => IndexMap::new(),
            Some(Value::Mapping(m)) => {
                let mut out = IndexMap::with_capacity(m.len());
                for (k, v) in m {
                    match k {
                        Value::String(k) => {
                            out.insert(k, v);
                        }
                        _ => {
                            return Err(de::Error::custom(format!(
                                "plugin '{name}': option keys must be strings"
                            )));
                        }
                    }
                }
                out
            }
            Some(_) => {
                return Err(de::Error::custom(format!(
                    "plugin '{name}': options must be a map"
                )));
            }
        };

        Ok(PluginBlock { name, options })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

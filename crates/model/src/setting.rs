//! PluginSetting - typed configuration node handed to plugin factories
//!
//! A `PluginSetting` carries the plugin name, the owning pipeline name, and a
//! string-keyed option map decoded from the pipeline configuration file.
//! Accessors are typed and take per-key defaults; a present key with the wrong
//! type is an error rather than a silent fallback.

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::plugin::{PluginError, PluginResult};

/// Configuration node for a single plugin instance
///
/// Invariants: the plugin name is non-empty, and the pipeline name is
/// populated before the setting reaches a plugin factory.
#[derive(Debug, Clone)]
pub struct PluginSetting {
    name: String,
    pipeline_name: Option<String>,
    settings: IndexMap<String, Value>,
}

impl PluginSetting {
    /// Create a setting for the named plugin with the given option map
    pub fn new(name: impl Into<String>, settings: IndexMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            pipeline_name: None,
            settings,
        }
    }

    /// Create a setting with no options
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, IndexMap::new())
    }

    /// The plugin name, as written in the configuration file
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning pipeline, once populated by the parser
    #[inline]
    pub fn pipeline_name(&self) -> Option<&str> {
        self.pipeline_name.as_deref()
    }

    /// Record the owning pipeline
    pub fn set_pipeline_name(&mut self, pipeline_name: impl Into<String>) {
        self.pipeline_name = Some(pipeline_name.into());
    }

    /// Builder-style variant of [`set_pipeline_name`](Self::set_pipeline_name)
    pub fn with_pipeline_name(mut self, pipeline_name: impl Into<String>) -> Self {
        self.set_pipeline_name(pipeline_name);
        self
    }

    /// Raw option value, if present
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Whether any options were provided
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// String option with a default
    pub fn get_str_or(&self, key: &str, default: &str) -> PluginResult<String> {
        match self.settings.get(key) {
            None => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.type_error(key, "a string", other)),
        }
    }

    /// Required string option
    pub fn require_str(&self, key: &str) -> PluginResult<String> {
        match self.settings.get(key) {
            None => Err(PluginError::invalid_setting(
                &self.name,
                key,
                "required option is missing",
            )),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.type_error(key, "a string", other)),
        }
    }

    /// Unsigned integer option with a default
    pub fn get_u64_or(&self, key: &str, default: u64) -> PluginResult<u64> {
        match self.settings.get(key) {
            None => Ok(default),
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| self.type_error(key, "a non-negative integer", &Value::Number(n.clone()))),
            Some(other) => Err(self.type_error(key, "a non-negative integer", other)),
        }
    }

    /// `usize` option with a default, for capacities and counts
    pub fn get_usize_or(&self, key: &str, default: usize) -> PluginResult<usize> {
        self.get_u64_or(key, default as u64).map(|v| v as usize)
    }

    /// Boolean option with a default
    pub fn get_bool_or(&self, key: &str, default: bool) -> PluginResult<bool> {
        match self.settings.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.type_error(key, "a boolean", other)),
        }
    }

    /// List-of-strings option; missing key yields an empty list
    pub fn get_string_list(&self, key: &str) -> PluginResult<Vec<String>> {
        match self.settings.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Sequence(seq)) => seq
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.type_error(key, "a list of strings", other)),
                })
                .collect(),
            Some(other) => Err(self.type_error(key, "a list of strings", other)),
        }
    }

    /// Nested option map, if present
    pub fn get_map(&self, key: &str) -> PluginResult<Option<IndexMap<String, Value>>> {
        match self.settings.get(key) {
            None => Ok(None),
            Some(Value::Mapping(m)) => {
                let mut out = IndexMap::with_capacity(m.len());
                for (k, v) in m {
                    match k {
                        Value::String(k) => {
                            out.insert(k.clone(), v.clone());
                        }
                        other => {
                            return Err(self.type_error(key, "a string-keyed map", other));
                        }
                    }
                }
                Ok(Some(out))
            }
            Some(other) => Err(self.type_error(key, "a map", other)),
        }
    }

    fn type_error(&self, key: &str, expected: &str, got: &Value) -> PluginError {
        PluginError::invalid_setting(
            &self.name,
            key,
            format!("expected {expected}, got {}", value_kind(got)),
        )
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a map",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[path = "setting_test.rs"]
mod tests;

//! Plugin identity and shared plugin errors

use thiserror::Error;

/// The four capability kinds a plugin can be registered under
///
/// Registry lookups are keyed by `(name, kind)`; a plugin named `stdout`
/// registered as a sink is not found when asked for as a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Source,
    Buffer,
    Processor,
    Sink,
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PluginKind::Source => "source",
            PluginKind::Buffer => "buffer",
            PluginKind::Processor => "processor",
            PluginKind::Sink => "sink",
        };
        f.write_str(s)
    }
}

/// Errors raised while resolving or constructing plugins
#[derive(Debug, Error)]
pub enum PluginError {
    /// No factory is registered under the requested name and kind
    #[error("no {kind} plugin named '{name}', available: [{available}]")]
    NoPluginFound {
        name: String,
        kind: PluginKind,
        available: String,
    },

    /// A configuration option was missing or had the wrong type
    #[error("plugin '{plugin}': invalid setting '{key}': {reason}")]
    InvalidSetting {
        plugin: String,
        key: String,
        reason: String,
    },

    /// The factory rejected the configuration as a whole
    #[error("plugin '{plugin}': {reason}")]
    ConstructionFailed { plugin: String, reason: String },
}

impl PluginError {
    /// Create a lookup-failure error
    pub fn not_found(name: impl Into<String>, kind: PluginKind, available: Vec<&str>) -> Self {
        Self::NoPluginFound {
            name: name.into(),
            kind,
            available: available.join(", "),
        }
    }

    /// Create an invalid-setting error
    pub fn invalid_setting(
        plugin: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            plugin: plugin.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a construction-failure error
    pub fn construction(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for plugin resolution and construction
pub type PluginResult<T> = std::result::Result<T, PluginError>;

//! Weir - Plugins
//!
//! Built-in plugins sufficient to run real pipelines from a configuration
//! file with no external services.
//!
//! # Available Plugins
//!
//! | Plugin | Kind | Purpose |
//! |--------|------|---------|
//! | `random` | source | UUID-string records on a fixed cadence |
//! | `file` | source | Read a file line-by-line into string records |
//! | `noop` | processor | Pass-through |
//! | `string_converter` | processor | Upper/lower-case string payloads |
//! | `stdout` | sink | Print records for debugging |
//! | `file` | sink | Line-per-record text file |
//! | `null` | sink | Discard (pipeline benchmarking) |
//!
//! The `bounded_blocking` buffer ships with `weir-core` and is registered by
//! [`default_registry`] alongside the plugins above.

pub mod processors;
pub mod sinks;
pub mod sources;

use weir_core::PluginRegistry;

/// Create a registry with every built-in plugin registered
pub fn default_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::with_core_plugins();

    registry.register_source(sources::random::PLUGIN_NAME, sources::random::RandomSourceFactory);
    registry.register_source(sources::file::PLUGIN_NAME, sources::file::FileSourceFactory);

    registry.register_processor(
        processors::noop::PLUGIN_NAME,
        processors::noop::NoopProcessorFactory,
    );
    registry.register_processor(
        processors::string_converter::PLUGIN_NAME,
        processors::string_converter::StringConverterFactory,
    );

    registry.register_sink(sinks::stdout::PLUGIN_NAME, sinks::stdout::StdoutSinkFactory);
    registry.register_sink(sinks::file::PLUGIN_NAME, sinks::file::FileSinkFactory);
    registry.register_sink(sinks::null::PLUGIN_NAME, sinks::null::NullSinkFactory);

    registry
}

#[cfg(test)]
mod tests {
    use weir_model::PluginKind;

    use super::default_registry;

    #[test]
    fn test_default_registry_contents() {
        let registry = default_registry();
        assert!(registry.contains("random", PluginKind::Source));
        assert!(registry.contains("file", PluginKind::Source));
        assert!(registry.contains("bounded_blocking", PluginKind::Buffer));
        assert!(registry.contains("noop", PluginKind::Processor));
        assert!(registry.contains("string_converter", PluginKind::Processor));
        assert!(registry.contains("stdout", PluginKind::Sink));
        assert!(registry.contains("file", PluginKind::Sink));
        assert!(registry.contains("null", PluginKind::Sink));
    }

    #[test]
    fn test_file_name_is_kind_scoped() {
        // `file` exists as both a source and a sink; the registry resolves by
        // kind, so neither shadows the other.
        let registry = default_registry();
        assert!(registry.contains("file", PluginKind::Source));
        assert!(registry.contains("file", PluginKind::Sink));
        assert!(!registry.contains("file", PluginKind::Processor));
    }
}

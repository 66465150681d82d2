//! Plugin registry - configuration-driven plugin instantiation
//!
//! The registry maps plugin names to factories, one table per capability
//! kind, so a `stdout` sink and a hypothetical `stdout` source can coexist.
//! Lookups failing either the name or the kind fail with `NoPluginFound`.
//!
//! # Design
//!
//! - **Compile-time extensibility**: implement one of the factory traits and
//!   register it before parsing pipelines
//! - **Write-once**: the registry is populated at startup and read-only while
//!   pipelines run
//! - **Config-driven**: the pipeline file names plugins; factories receive a
//!   [`PluginSetting`] whose pipeline name is already populated
//!
//! Factories must not perform blocking I/O during construction; network
//! dial-out belongs in `Source::start`, not the constructor.

use std::collections::HashMap;
use std::sync::Arc;

use weir_model::{
    Buffer, PluginError, PluginKind, PluginResult, PluginSetting, Processor, Sink, Source,
};

use crate::buffer::BlockingBufferFactory;

/// Factory for source plugins
pub trait SourceFactory: Send + Sync {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Source>>;
}

/// Factory for buffer plugins
pub trait BufferFactory: Send + Sync {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Buffer>>;
}

/// Factory for processor plugins
pub trait ProcessorFactory: Send + Sync {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Box<dyn Processor>>;
}

/// Factory for sink plugins
pub trait SinkFactory: Send + Sync {
    fn create(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Sink>>;
}

/// Name-and-capability keyed factory table, resolved at startup
pub struct PluginRegistry {
    sources: HashMap<String, Box<dyn SourceFactory>>,
    buffers: HashMap<String, Box<dyn BufferFactory>>,
    processors: HashMap<String, Box<dyn ProcessorFactory>>,
    sinks: HashMap<String, Box<dyn SinkFactory>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            buffers: HashMap::new(),
            processors: HashMap::new(),
            sinks: HashMap::new(),
        }
    }

    /// Create a registry with the core-provided plugins registered
    ///
    /// Currently that is the `bounded_blocking` buffer, which is also the
    /// default when a pipeline omits its `buffer` block.
    pub fn with_core_plugins() -> Self {
        let mut registry = Self::new();
        registry.register_buffer(crate::buffer::BLOCKING_BUFFER_PLUGIN_NAME, BlockingBufferFactory);
        registry
    }

    /// Register a source factory
    ///
    /// # Panics
    ///
    /// Panics if a source factory is already registered under this name.
    pub fn register_source<F: SourceFactory + 'static>(&mut self, name: &str, factory: F) {
        if self.sources.insert(name.to_string(), Box::new(factory)).is_some() {
            panic!("source plugin '{name}' already registered");
        }
    }

    /// Register a buffer factory
    ///
    /// # Panics
    ///
    /// Panics if a buffer factory is already registered under this name.
    pub fn register_buffer<F: BufferFactory + 'static>(&mut self, name: &str, factory: F) {
        if self.buffers.insert(name.to_string(), Box::new(factory)).is_some() {
            panic!("buffer plugin '{name}' already registered");
        }
    }

    /// Register a processor factory
    ///
    /// # Panics
    ///
    /// Panics if a processor factory is already registered under this name.
    pub fn register_processor<F: ProcessorFactory + 'static>(&mut self, name: &str, factory: F) {
        if self.processors.insert(name.to_string(), Box::new(factory)).is_some() {
            panic!("processor plugin '{name}' already registered");
        }
    }

    /// Register a sink factory
    ///
    /// # Panics
    ///
    /// Panics if a sink factory is already registered under this name.
    pub fn register_sink<F: SinkFactory + 'static>(&mut self, name: &str, factory: F) {
        if self.sinks.insert(name.to_string(), Box::new(factory)).is_some() {
            panic!("sink plugin '{name}' already registered");
        }
    }

    /// Whether a plugin is registered under this name and kind
    pub fn contains(&self, name: &str, kind: PluginKind) -> bool {
        match kind {
            PluginKind::Source => self.sources.contains_key(name),
            PluginKind::Buffer => self.buffers.contains_key(name),
            PluginKind::Processor => self.processors.contains_key(name),
            PluginKind::Sink => self.sinks.contains_key(name),
        }
    }

    /// Registered plugin names for a kind, sorted for stable error messages
    pub fn available(&self, kind: PluginKind) -> Vec<&str> {
        let mut names: Vec<&str> = match kind {
            PluginKind::Source => self.sources.keys().map(String::as_str).collect(),
            PluginKind::Buffer => self.buffers.keys().map(String::as_str).collect(),
            PluginKind::Processor => self.processors.keys().map(String::as_str).collect(),
            PluginKind::Sink => self.sinks.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    /// Instantiate a source plugin
    pub fn create_source(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Source>> {
        self.check_pipeline_name(setting)?;
        let factory = self.sources.get(setting.name()).ok_or_else(|| {
            PluginError::not_found(
                setting.name(),
                PluginKind::Source,
                self.available(PluginKind::Source),
            )
        })?;
        factory.create(setting)
    }

    /// Instantiate a buffer plugin
    pub fn create_buffer(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Buffer>> {
        self.check_pipeline_name(setting)?;
        let factory = self.buffers.get(setting.name()).ok_or_else(|| {
            PluginError::not_found(
                setting.name(),
                PluginKind::Buffer,
                self.available(PluginKind::Buffer),
            )
        })?;
        factory.create(setting)
    }

    /// Instantiate a processor plugin
    pub fn create_processor(&self, setting: &PluginSetting) -> PluginResult<Box<dyn Processor>> {
        self.check_pipeline_name(setting)?;
        let factory = self.processors.get(setting.name()).ok_or_else(|| {
            PluginError::not_found(
                setting.name(),
                PluginKind::Processor,
                self.available(PluginKind::Processor),
            )
        })?;
        factory.create(setting)
    }

    /// Instantiate a sink plugin
    pub fn create_sink(&self, setting: &PluginSetting) -> PluginResult<Arc<dyn Sink>> {
        self.check_pipeline_name(setting)?;
        let factory = self.sinks.get(setting.name()).ok_or_else(|| {
            PluginError::not_found(
                setting.name(),
                PluginKind::Sink,
                self.available(PluginKind::Sink),
            )
        })?;
        factory.create(setting)
    }

    fn check_pipeline_name(&self, setting: &PluginSetting) -> PluginResult<()> {
        if setting.pipeline_name().is_none() {
            return Err(PluginError::construction(
                setting.name(),
                "pipeline name must be populated before construction",
            ));
        }
        Ok(())
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_core_plugins()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use weir_model::{
    Buffer, PluginError, PluginKind, PluginResult, PluginSetting, Record, Sink, SinkResult,
    Source, SourceResult, SourceTask,
};

use super::{PluginRegistry, SinkFactory, SourceFactory};

struct IdleSource;

#[async_trait]
impl Source for IdleSource {
    async fn start(&self, _buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask> {
        Ok(None)
    }

    fn stop(&self) {}
}

struct DropSink;

#[async_trait]
impl Sink for DropSink {
    async fn output(&self, _records: &[Record]) -> SinkResult<()> {
        Ok(())
    }
}

struct IdleSourceFactory;

impl SourceFactory for IdleSourceFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<Arc<dyn Source>> {
        Ok(Arc::new(IdleSource))
    }
}

struct DropSinkFactory;

impl SinkFactory for DropSinkFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<Arc<dyn Sink>> {
        Ok(Arc::new(DropSink))
    }
}

fn setting(name: &str) -> PluginSetting {
    PluginSetting::empty(name).with_pipeline_name("test-pipeline")
}

#[test]
fn test_lookup_requires_matching_kind() {
    let mut registry = PluginRegistry::new();
    registry.register_sink("drop", DropSinkFactory);

    assert!(registry.contains("drop", PluginKind::Sink));
    assert!(!registry.contains("drop", PluginKind::Source));

    let err = match registry.create_source(&setting("drop")) {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    };
    assert!(matches!(err, PluginError::NoPluginFound { .. }));
}

#[test]
fn test_unknown_name_lists_available() {
    let mut registry = PluginRegistry::new();
    registry.register_source("idle", IdleSourceFactory);

    let err = match registry.create_source(&setting("missing")) {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    };
    assert!(err.to_string().contains("no source plugin named 'missing'"));
    assert!(err.to_string().contains("idle"));
}

#[test]
fn test_create_resolves_registered_factory() {
    let mut registry = PluginRegistry::new();
    registry.register_sink("drop", DropSinkFactory);
    assert!(registry.create_sink(&setting("drop")).is_ok());
}

#[test]
fn test_pipeline_name_must_be_populated() {
    let mut registry = PluginRegistry::new();
    registry.register_sink("drop", DropSinkFactory);

    let err = match registry.create_sink(&PluginSetting::empty("drop")) {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    };
    assert!(err.to_string().contains("pipeline name"));
}

#[test]
fn test_core_registry_has_default_buffer() {
    let registry = PluginRegistry::with_core_plugins();
    assert!(registry.contains("bounded_blocking", PluginKind::Buffer));

    let buffer = registry
        .create_buffer(&setting("bounded_blocking"))
        .unwrap();
    assert!(buffer.is_empty());
}

#[test]
#[should_panic(expected = "already registered")]
fn test_duplicate_registration_panics() {
    let mut registry = PluginRegistry::new();
    registry.register_sink("drop", DropSinkFactory);
    registry.register_sink("drop", DropSinkFactory);
}

#[tokio::test]
async fn test_created_buffer_is_usable() {
    let registry = PluginRegistry::with_core_plugins();
    let buffer = registry
        .create_buffer(&setting("bounded_blocking"))
        .unwrap();

    buffer
        .write(Record::from_string("x"), Duration::from_millis(50))
        .await
        .unwrap();
    let (batch, checkpoint) = buffer.read(Duration::from_millis(50)).await;
    assert_eq!(batch.len(), 1);
    buffer.checkpoint(checkpoint);
    assert!(buffer.is_empty());
}

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use weir_config::PipelinesConfig;
use weir_model::{
    Buffer, PluginResult, PluginSetting, Record, Sink, SinkResult, Source, SourceResult,
    SourceTask,
};

use crate::error::ParseError;
use crate::registry::{PluginRegistry, SinkFactory, SourceFactory};

use super::PipelineParser;

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

fn test_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::with_core_plugins();
    registry.register_source("idle", IdleSourceFactory);
    registry.register_sink("drop", DropSinkFactory);
    registry
}

fn parse(yaml: &str) -> Result<super::BuiltPipelines, ParseError> {
    let config = PipelinesConfig::from_str(yaml).unwrap();
    let registry = test_registry();
    PipelineParser::new(&registry).parse(&config)
}

#[test]
fn test_single_pipeline() {
    let built = parse(
        r#"
entry:
  source: {idle: }
  sink: [{drop: }]
"#,
    )
    .unwrap();
    assert_eq!(built.order, vec!["entry"]);
    assert!(built.pipelines.contains_key("entry"));
}

#[test]
fn test_default_buffer_is_bounded_blocking() {
    let built = parse(
        r#"
entry:
  source: {idle: }
  sink: [{drop: }]
"#,
    )
    .unwrap();
    assert!(built.pipelines["entry"].buffer().is_empty());
}

#[test]
fn test_connected_pipelines_order_roots_first() {
    let built = parse(
        r#"
downstream:
  source: {entry: }
  sink: [{drop: }]
entry:
  source: {idle: }
  sink: [{downstream: }]
"#,
    )
    .unwrap();
    assert_eq!(built.order, vec!["entry", "downstream"]);
}

#[test]
fn test_unknown_source_plugin() {
    let err = parse(
        r#"
entry:
  source: {bogus: }
  sink: [{drop: }]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("no source plugin named 'bogus'"));
}

#[test]
fn test_unknown_sink_plugin() {
    let err = parse(
        r#"
entry:
  source: {idle: }
  sink: [{bogus: }]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("no sink plugin named 'bogus'"));
}

#[test]
fn test_zero_sinks_rejected() {
    let err = parse(
        r#"
entry:
  source: {idle: }
  processor: [{noop: }]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("at least one sink"));
}

#[test]
fn test_cycle_rejected() {
    let err = parse(
        r#"
x:
  source: {y: }
  sink: [{y: }]
y:
  source: {x: }
  sink: [{x: }]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::CycleDetected { .. }));
    assert!(err.to_string().contains("cycle detected"));
}

#[test]
fn test_self_loop_rejected() {
    let err = parse(
        r#"
entry:
  source: {idle: }
  sink: [{entry: }]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("sink into itself"));
}

#[test]
fn test_dangling_connector_source_rejected() {
    // `downstream` claims to be fed by `entry`, but `entry` has no sink
    // pointing back at it.
    let err = parse(
        r#"
entry:
  source: {idle: }
  sink: [{drop: }]
downstream:
  source: {entry: }
  sink: [{drop: }]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("no sink targeting 'downstream'"));
}

#[test]
fn test_sink_into_externally_fed_pipeline_rejected() {
    // `entry` sinks into `downstream`, but `downstream` reads from its own
    // real source, so the connector would never reach its buffer.
    let err = parse(
        r#"
entry:
  source: {idle: }
  sink: [{downstream: }]
downstream:
  source: {idle: }
  sink: [{drop: }]
"#,
    )
    .unwrap_err();
    assert!(err
        .to_string()
        .contains("does not use a pipeline as its source"));
}

#[test]
fn test_dag_shape_survives_reparse() {
    let yaml = r#"
entry:
  source: {idle: }
  sink: [{downstream: }, {drop: }]
downstream:
  source: {entry: }
  sink: [{drop: }]
"#;
    let first = parse(yaml).unwrap();
    let second = parse(yaml).unwrap();
    assert_eq!(first.order, second.order);

    let mut first_names: Vec<_> = first.pipelines.keys().collect();
    let mut second_names: Vec<_> = second.pipelines.keys().collect();
    first_names.sort();
    second_names.sort();
    assert_eq!(first_names, second_names);
}

#[tokio::test]
async fn test_connector_bound_at_parse_time() {
    // The upstream connector sink can deliver into the downstream buffer
    // before either pipeline has started.
    let built = parse(
        r#"
entry:
  source: {idle: }
  sink: [{downstream: }]
downstream:
  source: {entry: }
  buffer:
    bounded_blocking: {buffer_size: 4, batch_size: 4}
  sink: [{drop: }]
"#,
    )
    .unwrap();

    let downstream = &built.pipelines["downstream"];
    assert!(downstream.buffer().is_empty());

    // Write through the downstream buffer directly to prove the handle works.
    downstream
        .buffer()
        .write(Record::from_string("probe"), Duration::from_millis(50))
        .await
        .unwrap();
    let (batch, checkpoint) = downstream.buffer().read(Duration::from_millis(50)).await;
    assert_eq!(batch.len(), 1);
    downstream.buffer().checkpoint(checkpoint);
}

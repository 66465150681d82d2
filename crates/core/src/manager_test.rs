use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use weir_config::PipelinesConfig;
use weir_model::{
    Buffer, PluginResult, PluginSetting, Record, Sink, SinkResult, Source, SourceError,
    SourceResult, SourceTask,
};

use crate::parse::PipelineParser;
use crate::pipeline::PipelineState;
use crate::registry::{PluginRegistry, SinkFactory, SourceFactory};

use super::PipelineManager;

/// Source emitting `count` numbered records, then idling until stopped
struct CountingSource {
    count: usize,
    token: CancellationToken,
}

#[async_trait]
impl Source for CountingSource {
    async fn start(&self, buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask> {
        let count = self.count;
        let token = self.token.clone();
        let handle = tokio::spawn(async move {
            for i in 0..count {
                if token.is_cancelled() {
                    break;
                }
                buffer
                    .write(Record::from_string(format!("n{i}")), Duration::from_secs(5))
                    .await?;
            }
            Ok(())
        });
        Ok(Some(handle))
    }

    fn stop(&self) {
        self.token.cancel();
    }
}

struct CountingSourceFactory {
    count: usize,
}

impl SourceFactory for CountingSourceFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<Arc<dyn Source>> {
        Ok(Arc::new(CountingSource {
            count: self.count,
            token: CancellationToken::new(),
        }))
    }
}

/// Source whose producing task crashes immediately
struct CrashingSource;

#[async_trait]
impl Source for CrashingSource {
    async fn start(&self, _buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask> {
        let handle = tokio::spawn(async move {
            Err(SourceError::failed("crashing", "listener died"))
        });
        Ok(Some(handle))
    }

    fn stop(&self) {}
}

struct CrashingSourceFactory;

impl SourceFactory for CrashingSourceFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<Arc<dyn Source>> {
        Ok(Arc::new(CrashingSource))
    }
}

/// Source that refuses to start at all
struct BrokenSourceFactory;

struct BrokenSource;

#[async_trait]
impl Source for BrokenSource {
    async fn start(&self, _buffer: Arc<dyn Buffer>) -> SourceResult<SourceTask> {
        Err(SourceError::start_failed("broken", "port already in use"))
    }

    fn stop(&self) {}
}

impl SourceFactory for BrokenSourceFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<Arc<dyn Source>> {
        Ok(Arc::new(BrokenSource))
    }
}

/// Sink collecting into storage shared with the test body
#[derive(Clone, Default)]
struct SharedCollectFactory {
    records: Arc<Mutex<Vec<Record>>>,
}

struct SharedCollectSink {
    records: Arc<Mutex<Vec<Record>>>,
}

#[async_trait]
impl Sink for SharedCollectSink {
    async fn output(&self, records: &[Record]) -> SinkResult<()> {
        self.records.lock().extend_from_slice(records);
        Ok(())
    }
}

impl SinkFactory for SharedCollectFactory {
    fn create(&self, _setting: &PluginSetting) -> PluginResult<Arc<dyn Sink>> {
        Ok(Arc::new(SharedCollectSink {
            records: Arc::clone(&self.records),
        }))
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

const TWO_PIPELINE_YAML: &str = r#"
entry:
  delay: 0
  read_timeout: 30
  source: {counting: }
  buffer:
    bounded_blocking: {buffer_size: 32, batch_size: 4}
  sink: [{terminal: }]
terminal:
  delay: 0
  read_timeout: 30
  source: {entry: }
  buffer:
    bounded_blocking: {buffer_size: 32, batch_size: 4}
  sink: [{collect: }]
"#;

fn build_connected(
    count: usize,
) -> (PipelineManager, Arc<Mutex<Vec<Record>>>) {
    let collect = SharedCollectFactory::default();
    let records = Arc::clone(&collect.records);

    let mut registry = PluginRegistry::with_core_plugins();
    registry.register_source("counting", CountingSourceFactory { count });
    registry.register_sink("collect", collect);

    let config = PipelinesConfig::from_str(TWO_PIPELINE_YAML).unwrap();
    let built = PipelineParser::new(&registry).parse(&config).unwrap();
    (PipelineManager::new(built), records)
}

#[tokio::test]
async fn test_connected_pipelines_deliver_through_manager() {
    let (manager, records) = build_connected(100);

    manager.start().await.unwrap();
    assert!(manager.is_running());
    assert_eq!(manager.list_running(), vec!["entry", "terminal"]);

    assert!(wait_until(|| records.lock().len() == 100, Duration::from_secs(10)).await);
    manager.shutdown().await;

    assert_eq!(records.lock().len(), 100);
    assert!(!manager.is_running());
    assert!(manager.list_running().is_empty());
    assert_eq!(
        manager.get("entry").unwrap().state(),
        PipelineState::Stopped
    );
    assert_eq!(
        manager.get("terminal").unwrap().state(),
        PipelineState::Stopped
    );
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let (manager, _records) = build_connected(1);
    manager.start().await.unwrap();
    manager.shutdown().await;
    manager.shutdown().await;
    assert!(!manager.is_running());
}

#[tokio::test]
async fn test_start_failure_tears_down_started_pipelines() {
    let collect = SharedCollectFactory::default();
    let mut registry = PluginRegistry::with_core_plugins();
    registry.register_source("counting", CountingSourceFactory { count: 1 });
    registry.register_source("broken", BrokenSourceFactory);
    registry.register_sink("collect", collect);

    let yaml = r#"
healthy:
  delay: 0
  read_timeout: 30
  source: {counting: }
  sink: [{collect: }]
doomed:
  delay: 0
  read_timeout: 30
  source: {broken: }
  sink: [{collect: }]
"#;
    let config = PipelinesConfig::from_str(yaml).unwrap();
    let built = PipelineParser::new(&registry).parse(&config).unwrap();
    let manager = PipelineManager::new(built);

    let err = manager.start().await.unwrap_err();
    assert!(err.to_string().contains("source failed to start"));
    assert!(!manager.is_running());
}

#[tokio::test]
async fn test_source_crash_stops_only_its_pipeline() {
    let collect = SharedCollectFactory::default();
    let mut registry = PluginRegistry::with_core_plugins();
    registry.register_source("counting", CountingSourceFactory { count: 1 });
    registry.register_source("crashing", CrashingSourceFactory);
    registry.register_sink("collect", collect);

    let yaml = r#"
stable:
  delay: 0
  read_timeout: 30
  source: {counting: }
  sink: [{collect: }]
flaky:
  delay: 0
  read_timeout: 30
  source: {crashing: }
  sink: [{collect: }]
"#;
    let config = PipelinesConfig::from_str(yaml).unwrap();
    let built = PipelineParser::new(&registry).parse(&config).unwrap();
    let manager = PipelineManager::new(built);

    manager.start().await.unwrap();

    let flaky = Arc::clone(manager.get("flaky").unwrap());
    assert!(
        wait_until(
            || flaky.state() == PipelineState::Stopped,
            Duration::from_secs(5)
        )
        .await
    );
    assert!(flaky.has_failed());

    // The sibling pipeline is unaffected.
    assert!(manager.get("stable").unwrap().is_running());
    assert_eq!(manager.list_running(), vec!["stable"]);

    manager.shutdown().await;
}

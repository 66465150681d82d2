//! Control API tests over a real listener
//!
//! Each test binds an ephemeral port, drives the API with plain HTTP/1.1
//! requests, and asserts on status line and body.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use weir_core::{
    BlockingBuffer, BuiltPipelines, Pipeline, PipelineManager, PipelineSettings,
};
use weir_model::{Buffer, Record, Sink, SinkResult, Source, SourceResult, SourceTask};
use weir_server::{serve_on, AppState};

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

fn test_manager(names: &[&str]) -> Arc<PipelineManager> {
    let mut pipelines = HashMap::new();
    let mut order = Vec::new();
    for name in names {
        let pipeline = Pipeline::new(
            *name,
            Arc::new(IdleSource) as Arc<dyn Source>,
            Arc::new(BlockingBuffer::new(8, 8, *name)) as Arc<dyn Buffer>,
            Vec::new(),
            vec![Arc::new(DropSink) as Arc<dyn Sink>],
            PipelineSettings {
                read_timeout: Duration::from_millis(30),
                delay: Duration::from_millis(10),
                ..PipelineSettings::default()
            },
        );
        pipelines.insert(name.to_string(), Arc::new(pipeline));
        order.push(name.to_string());
    }
    Arc::new(PipelineManager::new(BuiltPipelines { pipelines, order }))
}

async fn start_server(
    manager: Arc<PipelineManager>,
    prometheus_enabled: bool,
) -> (SocketAddr, CancellationToken) {
    let token = CancellationToken::new();
    let state = AppState::new(manager, token.clone(), prometheus_enabled);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_on(listener, state));
    (addr, token)
}

async fn request(addr: SocketAddr, method: &str, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request =
        format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8(response).unwrap();

    let status: u16 = response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("malformed status line");
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

#[tokio::test]
async fn test_list_returns_running_pipelines() {
    let manager = test_manager(&["entry", "terminal"]);
    manager.start().await.unwrap();
    let (addr, token) = start_server(Arc::clone(&manager), true).await;

    let (status, body) = request(addr, "GET", "/list").await;
    assert_eq!(status, 200);
    let names: Vec<String> = serde_json::from_str(&body).unwrap();
    assert_eq!(names, vec!["entry", "terminal"]);

    manager.shutdown().await;
    let (status, body) = request(addr, "GET", "/list").await;
    assert_eq!(status, 200);
    let names: Vec<String> = serde_json::from_str(&body).unwrap();
    assert!(names.is_empty());

    token.cancel();
}

#[tokio::test]
async fn test_shutdown_acknowledges_then_cancels() {
    let manager = test_manager(&["entry"]);
    manager.start().await.unwrap();
    let (addr, token) = start_server(Arc::clone(&manager), true).await;

    assert!(!token.is_cancelled());
    let (status, _body) = request(addr, "POST", "/shutdown").await;
    assert_eq!(status, 200);
    assert!(token.is_cancelled());

    manager.shutdown().await;
}

#[tokio::test]
async fn test_metrics_gated_on_registry() {
    let manager = test_manager(&["entry"]);
    let (addr, token) = start_server(manager, false).await;

    let (status, _body) = request(addr, "GET", "/metrics/prometheus").await;
    assert_eq!(status, 404);
    let (status, _body) = request(addr, "GET", "/metrics/sys").await;
    assert_eq!(status, 404);

    token.cancel();
}

#[tokio::test]
async fn test_metrics_prometheus_exposition() {
    let manager = test_manager(&["entry"]);
    manager.start().await.unwrap();
    let (addr, token) = start_server(Arc::clone(&manager), true).await;

    let (status, body) = request(addr, "GET", "/metrics/prometheus").await;
    assert_eq!(status, 200);
    assert!(body.contains("# TYPE weir_pipeline_records_read_total counter"));
    assert!(body.contains("weir_pipeline_records_read_total{pipeline=\"entry\"}"));

    let (status, body) = request(addr, "GET", "/metrics/sys").await;
    assert_eq!(status, 200);
    assert!(body.contains("weir_pipelines_running 1"));
    assert!(body.contains("weir_pipeline_up{pipeline=\"entry\"} 1"));

    manager.shutdown().await;
    token.cancel();
}

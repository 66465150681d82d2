//! Shared state for the control API

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use weir_core::PipelineManager;

/// State handed to every control API handler
#[derive(Clone)]
pub struct AppState {
    manager: Arc<PipelineManager>,
    shutdown: CancellationToken,
    prometheus_enabled: bool,
    started_at: Instant,
}

impl AppState {
    /// Create the control API state
    ///
    /// `shutdown` is the process-wide token: cancelling it triggers manager
    /// shutdown in the binary and stops the control server itself.
    pub fn new(
        manager: Arc<PipelineManager>,
        shutdown: CancellationToken,
        prometheus_enabled: bool,
    ) -> Self {
        Self {
            manager,
            shutdown,
            prometheus_enabled,
            started_at: Instant::now(),
        }
    }

    /// The pipeline manager
    pub fn manager(&self) -> &Arc<PipelineManager> {
        &self.manager
    }

    /// The process-wide shutdown token
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether `/metrics/*` routes are enabled
    pub fn prometheus_enabled(&self) -> bool {
        self.prometheus_enabled
    }

    /// Seconds since the control server state was created
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

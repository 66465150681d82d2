//! Pipeline manager - process-wide supervisor
//!
//! Owns the pipeline table, immutable after construction. Startup walks the
//! DAG leaves-first so downstream pipelines are ready before their feeders
//! produce; shutdown walks roots-first so records already in flight drain
//! toward the sinks instead of being stranded in buffers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StartError;
use crate::metrics::PipelineMetricsHandle;
use crate::parse::BuiltPipelines;
use crate::pipeline::Pipeline;

/// Supervisor for every pipeline in the process
pub struct PipelineManager {
    pipelines: HashMap<String, Arc<Pipeline>>,

    /// Topological order, roots first
    order: Vec<String>,
}

impl PipelineManager {
    /// Create a manager over the parsed pipelines
    pub fn new(built: BuiltPipelines) -> Self {
        Self {
            pipelines: built.pipelines,
            order: built.order,
        }
    }

    /// Start every pipeline, leaves first
    ///
    /// On failure the already-started pipelines are shut down and the error
    /// returned; the process should exit non-zero.
    pub async fn start(&self) -> Result<(), StartError> {
        tracing::info!(pipelines = self.order.len(), "starting pipelines");
        for name in self.order.iter().rev() {
            let Some(pipeline) = self.pipelines.get(name) else {
                continue;
            };
            if let Err(e) = Arc::clone(pipeline).start().await {
                tracing::error!(pipeline = %name, error = %e, "pipeline failed to start");
                self.shutdown().await;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stop every pipeline, roots first
    ///
    /// Each stop bounds its own drain wait, so shutdown terminates even when
    /// a sink is stuck. Idempotent.
    pub async fn shutdown(&self) {
        tracing::info!("shutting down pipelines");
        for name in &self.order {
            if let Some(pipeline) = self.pipelines.get(name) {
                pipeline.stop().await;
            }
        }
        tracing::info!("all pipelines stopped");
    }

    /// Names of pipelines currently in the started state
    pub fn list_running(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| {
                self.pipelines
                    .get(*name)
                    .is_some_and(|p| p.is_running())
            })
            .cloned()
            .collect()
    }

    /// Whether any pipeline is still running
    pub fn is_running(&self) -> bool {
        self.pipelines.values().any(|p| p.is_running())
    }

    /// Look up a pipeline by name
    pub fn get(&self, name: &str) -> Option<&Arc<Pipeline>> {
        self.pipelines.get(name)
    }

    /// All pipeline names in topological order
    pub fn pipeline_names(&self) -> &[String] {
        &self.order
    }

    /// Metrics handles for every pipeline, in topological order
    pub fn metrics(&self) -> Vec<PipelineMetricsHandle> {
        self.order
            .iter()
            .filter_map(|name| self.pipelines.get(name))
            .map(|p| p.metrics_handle())
            .collect()
    }
}

impl std::fmt::Debug for PipelineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineManager")
            .field("pipelines", &self.order)
            .field("running", &self.list_running())
            .finish()
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;

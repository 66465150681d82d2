//! Prometheus text exposition rendering
//!
//! Hand-rendered from metric snapshots; the counter set is small and fixed,
//! so a templated registry would be more machinery than metrics.

use std::fmt::Write;

use weir_core::PipelineMetricsHandle;

use crate::state::AppState;

/// Render per-pipeline counters
pub fn render_pipelines(handles: &[PipelineMetricsHandle]) -> String {
    let mut out = String::new();

    counter_block(
        &mut out,
        "weir_pipeline_records_read_total",
        "Records pulled from the pipeline buffer",
        handles,
        |s| s.records_read,
    );
    counter_block(
        &mut out,
        "weir_pipeline_records_checkpointed_total",
        "Records whose buffer capacity has been released",
        handles,
        |s| s.records_checkpointed,
    );
    counter_block(
        &mut out,
        "weir_pipeline_records_delivered_total",
        "Records handed to every sink",
        handles,
        |s| s.records_delivered,
    );
    counter_block(
        &mut out,
        "weir_pipeline_batches_dropped_total",
        "Batches dropped by failing processors",
        handles,
        |s| s.batches_dropped,
    );
    counter_block(
        &mut out,
        "weir_pipeline_sink_errors_total",
        "Failed sink deliveries",
        handles,
        |s| s.sink_errors,
    );

    let _ = writeln!(out, "# HELP weir_pipeline_records_in_flight Records read but not yet checkpointed");
    let _ = writeln!(out, "# TYPE weir_pipeline_records_in_flight gauge");
    for handle in handles {
        let _ = writeln!(
            out,
            "weir_pipeline_records_in_flight{{pipeline=\"{}\"}} {}",
            handle.pipeline(),
            handle.snapshot().records_in_flight
        );
    }

    out
}

/// Render process-level gauges
pub fn render_sys(state: &AppState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# HELP weir_uptime_seconds Seconds since the runtime started");
    let _ = writeln!(out, "# TYPE weir_uptime_seconds gauge");
    let _ = writeln!(out, "weir_uptime_seconds {}", state.uptime_seconds());

    let _ = writeln!(out, "# HELP weir_pipelines_running Pipelines in the started state");
    let _ = writeln!(out, "# TYPE weir_pipelines_running gauge");
    let _ = writeln!(
        out,
        "weir_pipelines_running {}",
        state.manager().list_running().len()
    );

    let _ = writeln!(out, "# HELP weir_pipeline_up Whether the pipeline is running");
    let _ = writeln!(out, "# TYPE weir_pipeline_up gauge");
    let running = state.manager().list_running();
    for name in state.manager().pipeline_names() {
        let up = u8::from(running.iter().any(|r| r == name));
        let _ = writeln!(out, "weir_pipeline_up{{pipeline=\"{name}\"}} {up}");
    }

    out
}

fn counter_block(
    out: &mut String,
    name: &str,
    help: &str,
    handles: &[PipelineMetricsHandle],
    value: impl Fn(&weir_core::PipelineMetricsSnapshot) -> u64,
) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} counter");
    for handle in handles {
        let snapshot = handle.snapshot();
        let _ = writeln!(
            out,
            "{name}{{pipeline=\"{}\"}} {}",
            handle.pipeline(),
            value(&snapshot)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::render_pipelines;

    #[test]
    fn test_render_without_pipelines_is_valid_exposition() {
        let text = render_pipelines(&[]);
        assert!(text.contains("# TYPE weir_pipeline_records_read_total counter"));
        assert!(text.contains("# TYPE weir_pipeline_records_in_flight gauge"));
        // No samples, only headers.
        assert!(!text.contains("pipeline=\""));
    }
}

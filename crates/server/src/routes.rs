//! Control API routes

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::prometheus;
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Build the control API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/list", get(list_pipelines))
        .route("/shutdown", post(shutdown))
        .route("/metrics/prometheus", get(metrics_prometheus))
        .route("/metrics/sys", get(metrics_sys))
        .with_state(state)
}

/// `GET /list` - names of running pipelines
async fn list_pipelines(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.manager().list_running())
}

/// `POST /shutdown` - acknowledge, then stop the process asynchronously
async fn shutdown(State(state): State<AppState>) -> StatusCode {
    tracing::info!("shutdown requested over the control API");
    // The binary listens on this token and runs the manager shutdown; the
    // response goes out before the pipelines start draining.
    state.shutdown_token().cancel();
    StatusCode::OK
}

/// `GET /metrics/prometheus` - pipeline counters
async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    if !state.prometheus_enabled() {
        return (StatusCode::NOT_FOUND, String::new()).into_response();
    }
    let body = prometheus::render_pipelines(&state.manager().metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

/// `GET /metrics/sys` - process and runtime gauges
async fn metrics_sys(State(state): State<AppState>) -> impl IntoResponse {
    if !state.prometheus_enabled() {
        return (StatusCode::NOT_FOUND, String::new()).into_response();
    }
    let body = prometheus::render_sys(&state);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

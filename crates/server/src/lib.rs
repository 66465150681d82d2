//! Weir - Server
//!
//! HTTP control API for a running Weir process.
//!
//! # Endpoints
//!
//! - `GET /list` - JSON array of running pipeline names
//! - `POST /shutdown` - 200 immediately, triggers manager shutdown asynchronously
//! - `GET /metrics/prometheus` - pipeline counters in Prometheus text format
//! - `GET /metrics/sys` - process/runtime gauges in Prometheus text format
//!
//! The `/metrics/*` routes are gated on the Prometheus registry being listed
//! in the server configuration and return 404 otherwise.
//!
//! # Usage
//!
//! ```ignore
//! use weir_server::{serve, AppState};
//!
//! let state = AppState::new(manager, shutdown_token, config.prometheus_enabled());
//! tokio::spawn(serve(config, state));
//! ```

mod prometheus;
mod routes;
mod state;

use std::net::SocketAddr;

use tokio::net::TcpListener;

pub use routes::build_router;
pub use state::AppState;

use weir_config::ServerConfig;

/// Bind the control API and serve it until the shutdown token fires
pub async fn serve(config: ServerConfig, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr).await?;
    if config.ssl {
        // Keystore material is validated at config load; termination itself
        // is delegated to the deployment's ingress.
        tracing::warn!("ssl is configured; serving plaintext behind the TLS terminator");
    }
    serve_on(listener, state).await
}

/// Serve the control API on an already-bound listener
///
/// Split out from [`serve`] so tests can bind an ephemeral port.
pub async fn serve_on(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "control server listening");

    let shutdown = state.shutdown_token();
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

//! Read-only HTTP API over the published snapshot
//!
//! Handlers never compute analytics; they serialize whatever the last
//! successful refresh published. Before the first refresh every report
//! endpoint answers 503.

pub mod handlers;

use std::net::SocketAddr;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::refresh::SnapshotHandle;

use handlers::{
    get_brand, get_current, get_metrics, get_report, get_rising, get_seasonal, get_series,
    get_share, get_stability, health_check,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Published snapshot
    pub snapshots: SnapshotHandle,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(snapshots: SnapshotHandle) -> Self {
        Self {
            snapshots,
            start_time: Instant::now(),
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/report", get(get_report))
        .route("/report/current", get(get_current))
        .route("/report/rising", get(get_rising))
        .route("/report/stability", get(get_stability))
        .route("/report/share", get(get_share))
        .route("/report/brand", get(get_brand))
        .route("/entities/{entity}/seasonal", get(get_seasonal))
        .route("/entities/{entity}/series", get(get_series))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the API until `shutdown` flips to `true`
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(addr = %addr, "Trend API listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            while shutdown.changed().await.is_ok() {
                if *shutdown.borrow() {
                    break;
                }
            }
        })
        .await
        .context("Server error")?;

    Ok(())
}

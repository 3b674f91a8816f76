//! REST API handlers over the published snapshot

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::analytics::{CurrentValue, MarketShare, MonthlyMean, RisingEntity, StabilityRow};
use crate::metrics;
use crate::models::SeriesPoint;
use crate::refresh::Snapshot;

use super::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub snapshot_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<String>,
}

/// Both stability rankings
#[derive(Debug, Serialize)]
pub struct StabilityResponse<'a> {
    pub most_stable: &'a [StabilityRow],
    pub most_volatile: &'a [StabilityRow],
}

/// Series of one entity
#[derive(Debug, Serialize)]
pub struct EntitySeriesResponse<'a, T: Serialize> {
    pub entity: &'a str,
    pub points: &'a [T],
}

// ============================================================================
// Helpers
// ============================================================================

fn not_ready() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new("No snapshot published yet")),
    )
        .into_response()
}

fn not_found(entity: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("Unknown entity: {entity}"))),
    )
        .into_response()
}

/// Run `render` against the current snapshot, recording request metrics
async fn with_snapshot<F>(state: &AppState, endpoint: &str, render: F) -> Response
where
    F: FnOnce(&Snapshot) -> Response,
{
    let started = Instant::now();
    let response = match state.snapshots.current().await {
        Some(snapshot) => render(snapshot.as_ref()),
        None => not_ready(),
    };
    metrics::record_api_request(
        endpoint,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot: Option<Arc<Snapshot>> = state.snapshots.current().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        snapshot_ready: snapshot.is_some(),
        refreshed_at: snapshot.map(|s| s.refreshed_at.to_rfc3339()),
    })
}

/// Full report
pub async fn get_report(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "/report", |s| ok(&s.report)).await
}

/// Current-value top-k
pub async fn get_current(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "/report/current", |s| {
        ok::<&[CurrentValue]>(&s.report.top_current)
    })
    .await
}

/// Rising top-k
pub async fn get_rising(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "/report/rising", |s| {
        ok::<&[RisingEntity]>(&s.report.rising)
    })
    .await
}

/// Most stable and most volatile
pub async fn get_stability(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "/report/stability", |s| {
        ok(StabilityResponse {
            most_stable: &s.report.most_stable,
            most_volatile: &s.report.most_volatile,
        })
    })
    .await
}

/// Market share
pub async fn get_share(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "/report/share", |s| {
        ok::<&[MarketShare]>(&s.report.market_share)
    })
    .await
}

/// Watched entity series
pub async fn get_brand(State(state): State<AppState>) -> Response {
    with_snapshot(&state, "/report/brand", |s| {
        ok(EntitySeriesResponse::<SeriesPoint> {
            entity: &s.report.watched_entity,
            points: &s.report.brand_series,
        })
    })
    .await
}

/// Monthly means of one entity
pub async fn get_seasonal(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Response {
    with_snapshot(&state, "/entities/seasonal", |s| {
        if !s.store.contains(&entity) {
            return not_found(&entity);
        }
        ok(EntitySeriesResponse::<MonthlyMean> {
            entity: &entity,
            points: s.report.seasonal_for(&entity),
        })
    })
    .await
}

/// Raw daily series of one entity
pub async fn get_series(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Response {
    with_snapshot(&state, "/entities/series", |s| {
        if !s.store.contains(&entity) {
            return not_found(&entity);
        }
        ok(EntitySeriesResponse::<SeriesPoint> {
            entity: &entity,
            points: s.store.series_for(&entity),
        })
    })
    .await
}

/// Prometheus exposition
pub async fn get_metrics() -> Response {
    if !metrics::metrics_initialized() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Metrics are not initialized")),
        )
            .into_response();
    }

    match metrics::encode_metrics() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Failed to encode metrics: {e}"))),
        )
            .into_response(),
    }
}

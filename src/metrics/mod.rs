//! Prometheus metrics for refresh cycles and the read API
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, or never happens, metrics operations are no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram,
    register_histogram_vec, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramVec,
    TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for refresh and API metrics
struct TrendMetrics {
    refreshes: CounterVec,
    refresh_failures: CounterVec,
    refresh_duration: Histogram,
    duplicates: Counter,
    tracked_entities: Gauge,
    last_success: Gauge,
    api_requests: CounterVec,
    api_duration: HistogramVec,
}

static METRICS: OnceLock<TrendMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// # Example
///
/// ```ignore
/// if let Err(e) = gemtrend::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = TrendMetrics {
        refreshes: register_counter_vec!(
            "gemtrend_refreshes_total",
            "Total refresh cycles by outcome",
            &["status"]
        )?,
        refresh_failures: register_counter_vec!(
            "gemtrend_refresh_failures_total",
            "Failed refresh cycles by error category",
            &["category"]
        )?,
        refresh_duration: register_histogram!(
            "gemtrend_refresh_duration_seconds",
            "Time spent on one refresh cycle in seconds",
            vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
        )?,
        duplicates: register_counter!(
            "gemtrend_duplicate_observations_total",
            "Total same-entity/same-date observations dropped at ingestion"
        )?,
        tracked_entities: register_gauge!(
            "gemtrend_tracked_entities",
            "Number of entities in the published snapshot"
        )?,
        last_success: register_gauge!(
            "gemtrend_last_successful_refresh_timestamp_seconds",
            "Unix time of the last successful refresh"
        )?,
        api_requests: register_counter_vec!(
            "gemtrend_api_requests_total",
            "Total API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
        api_duration: register_histogram_vec!(
            "gemtrend_api_request_duration_seconds",
            "API request duration in seconds",
            &["endpoint"],
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
        )?,
    };

    METRICS
        .set(metrics)
        .map_err(|_| "Metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record the outcome of a refresh cycle
pub fn record_refresh(status: &str, duration_secs: f64) {
    let Some(m) = METRICS.get() else {
        return;
    };

    m.refreshes.with_label_values(&[status]).inc();
    m.refresh_duration.observe(duration_secs);
    if status == "success" {
        m.last_success.set(chrono::Utc::now().timestamp() as f64);
    }
}

/// Record the error category of a failed refresh
pub fn record_refresh_failure(category: &str) {
    if let Some(m) = METRICS.get() {
        m.refresh_failures.with_label_values(&[category]).inc();
    }
}

/// Record duplicates dropped during ingestion
pub fn record_duplicates(count: usize) {
    if count == 0 {
        return;
    }
    if let Some(m) = METRICS.get() {
        m.duplicates.inc_by(count as f64);
    }
}

/// Update the tracked entity gauge
pub fn set_tracked_entities(count: usize) {
    if let Some(m) = METRICS.get() {
        m.tracked_entities.set(count as f64);
    }
}

/// Record API request
pub fn record_api_request(endpoint: &str, status: u16, duration_secs: f64) {
    let Some(m) = METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.api_requests
        .with_label_values(&[endpoint, status_str.as_str()])
        .inc();
    m.api_duration
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

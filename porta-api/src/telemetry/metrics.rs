//! Prometheus Metrics Definitions
//!
//! Defines all Porta metrics with their labels and types, and the handler
//! behind `GET /metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Command latency buckets (seconds), up to the maximum allowed timeout.
const COMMAND_LATENCY_BUCKETS: &[f64] =
    &[0.010, 0.050, 0.100, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

/// Global metrics instance - initialized once on first use
pub static METRICS: Lazy<ApiResult<PortaMetrics>> = Lazy::new(PortaMetrics::new);

/// Container for all Porta metrics.
#[derive(Clone)]
pub struct PortaMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Gateway operation counter - labels: operation, status
    pub operations_total: CounterVec,

    /// Command and pipeline duration - labels: operation
    pub command_duration_seconds: HistogramVec,

    /// Rejected requests - labels: reason (missing/invalid)
    pub auth_rejections_total: CounterVec,

    /// Swallowed ledger failures - labels: stage (register/append)
    pub ledger_failures_total: CounterVec,
}

impl PortaMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "porta_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "porta_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            operations_total: register_counter_vec!(
                "porta_operations_total",
                "Total number of gateway operations",
                &["operation", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register operations_total: {}", e)))?,

            command_duration_seconds: register_histogram_vec!(
                "porta_command_duration_seconds",
                "Command and pipeline wall-clock duration in seconds",
                &["operation"],
                COMMAND_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register command_duration_seconds: {}", e)))?,

            auth_rejections_total: register_counter_vec!(
                "porta_auth_rejections_total",
                "Requests rejected by the access guard",
                &["reason"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register auth_rejections_total: {}", e)))?,

            ledger_failures_total: register_counter_vec!(
                "porta_ledger_failures_total",
                "Ledger writes that failed and were skipped",
                &["stage"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register ledger_failures_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a gateway operation outcome.
    pub fn record_operation(&self, operation: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.operations_total
            .with_label_values(&[operation, status])
            .inc();
    }

    /// Record how long a command or pipeline ran.
    pub fn record_command_duration(&self, operation: &str, duration_secs: f64) {
        self.command_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_auth_rejection(&self, reason: &str) {
        self.auth_rejections_total.with_label_values(&[reason]).inc();
    }

    pub fn record_ledger_failure(&self, stage: &str) {
        self.ledger_failures_total.with_label_values(&[stage]).inc();
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    // Touch the registry so an empty scrape still lists Porta metrics.
    if let Err(e) = METRICS.as_ref() {
        tracing::error!(error = %e, "Metrics registry unavailable");
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

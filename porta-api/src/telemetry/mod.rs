//! Porta Telemetry - Observability Infrastructure
//!
//! Structured logging through `tracing` and Prometheus metrics for the API
//! layer. Nothing here needs an external collector.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics_handler, PortaMetrics, METRICS};
pub use middleware::{observability_middleware, REQUEST_ID_HEADER};
pub use tracer::{init_tracer, LogFormat, TelemetryConfig};

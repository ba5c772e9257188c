//! Porta API - HTTP Layer for the Agent Operation Gateway
//!
//! Binds the `porta-gateway` operations to an axum router: token access
//! control, JSON request/response types, the error-to-status mapping,
//! Prometheus metrics and structured logging.
//!
//! The server binary (`porta`) lives in `main.rs`; integration tests build
//! the same router with `create_api_router` and drive it in process.

pub mod config;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

pub use config::{ApiConfig, DEFAULT_PORT};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{access_middleware, AccessMiddlewareError, AccessMiddlewareState};
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;

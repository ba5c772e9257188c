//! REST API Routes Module
//!
//! Route handlers organized by concern:
//! - `meta`: service index, `/meta`, `/public_url`
//! - `bash`: single command execution
//! - `files`: write, read and list
//! - `agent`: status ping, agent listing, operation history
//! - `pipeline`: sequential multi-command execution
//!
//! `create_api_router` assembles them behind the access guard, the
//! observability middleware and CORS.

pub mod agent;
pub mod bash;
pub mod files;
pub mod meta;
pub mod pipeline;

use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use porta_core::OperationDetail;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::config::ApiConfig;
use crate::middleware::{access_middleware, AccessMiddlewareState};
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware, METRICS, REQUEST_ID_HEADER};

pub use agent::create_router as agent_router;
pub use bash::create_router as bash_router;
pub use files::create_router as files_router;
pub use meta::create_router as meta_router;
pub use pipeline::create_router as pipeline_router;

// ============================================================================
// AUDIT
// ============================================================================

/// Count the operation and, when the caller named an agent, append it to the
/// ledger. Ledger failures are counted and logged, never returned.
pub(crate) async fn audit(
    state: &AppState,
    agent_id: Option<&str>,
    operation: &str,
    detail: serde_json::Value,
    success: bool,
) {
    let metrics = METRICS.as_ref().ok();
    if let Some(metrics) = metrics {
        metrics.record_operation(operation, success);
    }

    let Some(agent_id) = agent_id else {
        return;
    };

    let outcome = state
        .ledger
        .record(agent_id, operation, OperationDetail::from_value(detail), success)
        .await;

    if let Some(metrics) = metrics {
        if !outcome.registered {
            metrics.record_ledger_failure("register");
        }
        if outcome.sequence_id.is_none() {
            metrics.record_ledger_failure("append");
        }
    }
}

// ============================================================================
// CORS
// ============================================================================

fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(porta_gateway::TOKEN_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the complete router: every route, static assets under the public
/// prefix, the access guard, observability and CORS.
pub fn create_api_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .merge(meta::create_router())
        .merge(bash::create_router())
        .merge(files::create_router())
        .merge(agent::create_router())
        .merge(pipeline::create_router())
        .route("/metrics", get(metrics_handler));

    let prefix = config.public_prefix.trim_end_matches('/');
    if prefix.starts_with('/') {
        router = router.nest_service(prefix, ServeDir::new(&config.static_dir));
    } else {
        tracing::warn!(
            prefix = %config.public_prefix,
            "Public prefix must start with '/' and not be the root; static assets disabled"
        );
    }

    let access_state = AccessMiddlewareState::new(state.guard.clone());

    router
        .with_state(state)
        .layer(from_fn_with_state(access_state, access_middleware))
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(&config))
}

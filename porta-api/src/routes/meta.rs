//! Service Info Routes
//!
//! `GET /`, `GET /meta` and `GET /public_url`. Timestamps come from the
//! ledger's clock; nothing here writes to it.

use std::io::ErrorKind;
use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::config::ApiConfig;
use crate::state::AppState;
use crate::types::{IndexResponse, MetaResponse, MethodDescriptor, PublicUrlResponse};

pub const SERVICE_NAME: &str = "Porta";
pub const SERVICE_DESCRIPTION: &str = "Local operation gateway for autonomous agents";

/// Every route the service answers, as listed by `/meta`.
pub const ENDPOINTS: &[&str] = &[
    "/",
    "/meta",
    "/public_url",
    "/metrics",
    "/run_bash",
    "/write_file",
    "/read_file",
    "/list_dir",
    "/agent/status",
    "/agent/list",
    "/agent/history",
    "/agent/pipeline",
];

fn method_catalogue() -> Vec<MethodDescriptor> {
    let post = |name: &str, description: &str, endpoint: &str, parameters: serde_json::Value| {
        MethodDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            endpoint: endpoint.to_string(),
            method: "POST".to_string(),
            parameters,
        }
    };

    vec![
        post(
            "run_bash",
            "Run a shell command",
            "/run_bash",
            json!({"cmd": "string", "agent_id": "string (optional)"}),
        ),
        post(
            "write_file",
            "Create or overwrite a file",
            "/write_file",
            json!({"path": "string", "content": "string", "agent_id": "string (optional)"}),
        ),
        post(
            "read_file",
            "Read a text file",
            "/read_file",
            json!({"path": "string", "agent_id": "string (optional)"}),
        ),
        post(
            "list_dir",
            "List a directory",
            "/list_dir",
            json!({"path": "string", "include_hidden": "boolean", "agent_id": "string (optional)"}),
        ),
        post(
            "agent_status",
            "Agent liveness ping",
            "/agent/status",
            json!({"agent_id": "string"}),
        ),
        post(
            "agent_list",
            "List known agents",
            "/agent/list",
            json!({"limit": "integer (optional)", "offset": "integer (optional)", "status": "string (optional)"}),
        ),
        post(
            "agent_history",
            "Operation history of one agent",
            "/agent/history",
            json!({"agent_id": "string", "limit": "integer (optional)", "operation_type": "string (optional)"}),
        ),
        post(
            "agent_pipeline",
            "Run commands in order, stopping at the first failure",
            "/agent/pipeline",
            json!({"agent_id": "string", "commands": "string[]", "timeout": "integer (optional)"}),
        ),
    ]
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn index(State(config): State<Arc<ApiConfig>>) -> impl IntoResponse {
    Json(IndexResponse {
        name: SERVICE_NAME.to_string(),
        description: SERVICE_DESCRIPTION.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        security: config.security_mode().to_string(),
        methods: method_catalogue(),
    })
}

pub async fn meta(State(state): State<AppState>) -> impl IntoResponse {
    Json(MetaResponse {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: SERVICE_DESCRIPTION.to_string(),
        uptime: state.process.uptime_secs(),
        pid: std::process::id(),
        port: state.config.port,
        security: state.config.security_mode().to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        timestamp: state.ledger.now(),
    })
}

/// Report the tunnel URL written by an external process. Never fails; an
/// absent or unreadable file yields `available: false`.
pub async fn public_url(State(state): State<AppState>) -> impl IntoResponse {
    let file = &state.config.public_url_file;
    let timestamp = state.ledger.now();

    let response = match tokio::fs::read_to_string(file).await {
        Ok(content) => PublicUrlResponse {
            public_url: Some(content.trim().to_string()),
            available: true,
            message: None,
            error: None,
            timestamp,
        },
        Err(e) if e.kind() == ErrorKind::NotFound => PublicUrlResponse {
            public_url: None,
            available: false,
            message: Some(format!("{} not found", file.display())),
            error: None,
            timestamp,
        },
        Err(e) => {
            tracing::error!(file = %file.display(), error = %e, "Failed to read public URL file");
            PublicUrlResponse {
                public_url: None,
                available: false,
                message: None,
                error: Some(e.to_string()),
                timestamp,
            }
        }
    };

    Json(response)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/meta", get(meta))
        .route("/public_url", get(public_url))
}

//! Porta Server Entry Point
//!
//! Reads configuration from the environment, opens the LMDB ledger and
//! serves the axum router until Ctrl-C.

use std::sync::Arc;

use axum::Router;
use porta_api::telemetry::{init_tracer, TelemetryConfig};
use porta_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use porta_storage::LmdbLedger;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let config = ApiConfig::from_env()
        .map_err(|e| ApiError::invalid_input(format!("Invalid configuration: {}", e)))?;

    if !config.is_auth_enabled() {
        tracing::warn!("PORTA_TOKEN is not set; every request is accepted without a token");
    }

    let ledger = LmdbLedger::open(&config.ledger_path, config.ledger_map_size_mb)?;
    tracing::info!(path = %config.ledger_path.display(), "Ledger opened");

    let addr = config
        .bind_addr()
        .map_err(|e| ApiError::invalid_input(format!("Invalid configuration: {}", e)))?;
    let state = AppState::new(config, Arc::new(ledger));
    let app: Router = create_api_router(state);

    tracing::info!(%addr, "Starting Porta server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

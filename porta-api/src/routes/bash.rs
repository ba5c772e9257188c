//! Command Execution Route
//!
//! `POST /run_bash` runs one command through the configured shell, bounded by
//! `PORTA_COMMAND_TIMEOUT_SECS`.

use std::time::Instant;

use axum::{extract::State, routing::post, Json, Router};
use porta_core::operation_types;
use serde_json::json;

use crate::error::ApiResult;
use crate::extractors::ApiJson;
use crate::routes::audit;
use crate::state::AppState;
use crate::telemetry::METRICS;
use crate::types::{caller_agent, RunBashRequest, RunBashResponse};

pub async fn run_bash(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RunBashRequest>,
) -> ApiResult<Json<RunBashResponse>> {
    let agent_id = caller_agent(&req.agent_id).map(str::to_string);
    let started = Instant::now();
    let result = state
        .executor
        .execute(&req.cmd, state.config.command_timeout)
        .await;

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_command_duration(operation_types::RUN_BASH, started.elapsed().as_secs_f64());
    }

    match result {
        Ok(output) => {
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::RUN_BASH,
                json!({"cmd": req.cmd, "exit_code": output.exit_code}),
                output.success,
            )
            .await;

            Ok(Json(RunBashResponse {
                stdout: output.stdout,
                stderr: output.stderr,
                exit_code: output.exit_code,
                success: output.success,
                agent_id,
            }))
        }
        Err(err) => {
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::RUN_BASH,
                json!({"cmd": req.cmd, "error": err.to_string()}),
                false,
            )
            .await;
            Err(err.into())
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/run_bash", post(run_bash))
}

//! Pipeline Route
//!
//! `POST /agent/pipeline` runs commands one after another and stops at the
//! first failing step. A failed step is a normal outcome (200 with
//! `success: false`); the whole run is one ledger entry.

use axum::{extract::State, routing::post, Json, Router};
use porta_core::operation_types;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::extractors::ApiJson;
use crate::routes::audit;
use crate::state::AppState;
use crate::telemetry::METRICS;
use crate::types::{PipelineRequest, PipelineResponse};

pub async fn run_pipeline(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PipelineRequest>,
) -> ApiResult<Json<PipelineResponse>> {
    let agent_id = req.agent_id.trim().to_string();
    if agent_id.is_empty() {
        return Err(ApiError::missing_field("agent_id"));
    }

    let step_timeout = state.config.pipeline_step_timeout(req.timeout);
    tracing::info!(
        agent_id = %agent_id,
        commands = req.commands.len(),
        step_timeout_secs = step_timeout.as_secs(),
        "Starting pipeline"
    );

    let result = state.pipeline.run(&req.commands, step_timeout).await;
    let execution_time = result.elapsed.as_secs_f64();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_command_duration(operation_types::PIPELINE, execution_time);
    }

    tracing::info!(
        agent_id = %agent_id,
        success = result.success,
        executed = result.executed_count,
        total = result.total_count,
        "Pipeline finished"
    );

    audit(
        &state,
        Some(agent_id.as_str()),
        operation_types::PIPELINE,
        json!({
            "commands": req.commands,
            "executed_commands": result.executed_count,
            "total_commands": result.total_count,
            "execution_time": execution_time,
        }),
        result.success,
    )
    .await;

    Ok(Json(PipelineResponse {
        success: result.success,
        agent_id,
        total_commands: result.total_count,
        executed_commands: result.executed_count,
        execution_time,
        results: result.results,
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/agent/pipeline", post(run_pipeline))
}

//! Agent Routes
//!
//! - `POST /agent/status`: liveness ping, recorded in the ledger
//! - `POST /agent/list`: paginated agent listing, most recently seen first
//! - `POST /agent/history`: one agent's operations, newest first

use axum::{extract::State, routing::post, Json, Router};
use porta_core::{operation_types, AgentQuery, AgentStatus, HistoryQuery};
use porta_gateway::AgentLedger;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::extractors::ApiJson;
use crate::routes::audit;
use crate::state::AppState;
use crate::types::{
    AgentHistoryRequest, AgentHistoryResponse, AgentListRequest,
    AgentListResponse, AgentStatusRequest, AgentStatusResponse,
};

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn agent_status(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AgentStatusRequest>,
) -> ApiResult<Json<AgentStatusResponse>> {
    let trimmed = req.agent_id.trim();
    let agent_id = (!trimmed.is_empty()).then(|| trimmed.to_string());

    if let (Some(id), Some(name)) = (agent_id.as_deref(), req.display_name.as_deref()) {
        if let Err(e) = state.ledger.register(id, Some(name)).await {
            tracing::warn!(agent_id = id, error = %e, "Failed to store display name");
        }
    }

    audit(
        &state,
        agent_id.as_deref(),
        operation_types::AGENT_STATUS,
        json!({"status": "ok"}),
        true,
    )
    .await;

    Ok(Json(AgentStatusResponse {
        status: "ok".to_string(),
        agent_id: req.agent_id,
        timestamp: state.ledger.now(),
    }))
}

pub async fn list_agents(
    State(ledger): State<AgentLedger>,
    ApiJson(req): ApiJson<AgentListRequest>,
) -> ApiResult<Json<AgentListResponse>> {
    let status = req
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AgentStatus::from_db_str)
        .transpose()?;

    let query = AgentQuery::new(req.limit, req.offset, status);
    let page = ledger.list_agents(&query).await?;

    Ok(Json(AgentListResponse {
        agents: page.agents,
        total: page.total,
        limit: query.limit,
        offset: query.offset,
    }))
}

pub async fn agent_history(
    State(ledger): State<AgentLedger>,
    ApiJson(req): ApiJson<AgentHistoryRequest>,
) -> ApiResult<Json<AgentHistoryResponse>> {
    let agent_id = req.agent_id.trim();
    if agent_id.is_empty() {
        return Err(ApiError::missing_field("agent_id"));
    }

    let query = HistoryQuery::new(agent_id, req.limit, req.operation_type);
    let operations = ledger.history(&query).await?;

    Ok(Json(AgentHistoryResponse {
        agent_id: agent_id.to_string(),
        total: operations.len(),
        operations,
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/agent/status", post(agent_status))
        .route("/agent/list", post(list_agents))
        .route("/agent/history", post(agent_history))
}

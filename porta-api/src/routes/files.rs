//! File Access Routes
//!
//! `POST /write_file`, `POST /read_file` and `POST /list_dir`. Paths go
//! through the sanitizer inside `FileAccessor`; rejected paths never reach
//! the filesystem.

use axum::{extract::State, routing::post, Json, Router};
use porta_core::operation_types;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::extractors::ApiJson;
use crate::routes::audit;
use crate::state::AppState;
use crate::types::{
    caller_agent, ListDirRequest, ListDirResponse, ReadFileRequest, ReadFileResponse,
    WriteFileRequest, WriteFileResponse,
};

pub async fn write_file(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WriteFileRequest>,
) -> ApiResult<Json<WriteFileResponse>> {
    let agent_id = caller_agent(&req.agent_id).map(str::to_string);

    match state.files.write_file(&req.path, &req.content).await {
        Ok(path) => {
            let path = path.display().to_string();
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::WRITE_FILE,
                json!({"path": path, "bytes": req.content.len()}),
                true,
            )
            .await;

            Ok(Json(WriteFileResponse {
                success: true,
                message: "File written".to_string(),
                path,
                agent_id,
            }))
        }
        Err(err) => {
            tracing::warn!(path = %req.path, error = %err, "write_file failed");
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::WRITE_FILE,
                json!({"path": req.path, "error": err.to_string()}),
                false,
            )
            .await;
            Err(err.into())
        }
    }
}

pub async fn read_file(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReadFileRequest>,
) -> ApiResult<Json<ReadFileResponse>> {
    let agent_id = caller_agent(&req.agent_id).map(str::to_string);

    match state.files.read_file(&req.path).await {
        Ok(file) => {
            let path = file.path.display().to_string();
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::READ_FILE,
                json!({"path": path, "bytes": file.content.len()}),
                true,
            )
            .await;

            Ok(Json(ReadFileResponse {
                success: true,
                content: file.content,
                path,
                agent_id,
            }))
        }
        Err(err) => {
            tracing::warn!(path = %req.path, error = %err, "read_file failed");
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::READ_FILE,
                json!({"path": req.path, "error": err.to_string()}),
                false,
            )
            .await;
            Err(err.into())
        }
    }
}

pub async fn list_dir(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ListDirRequest>,
) -> ApiResult<Json<ListDirResponse>> {
    let agent_id = caller_agent(&req.agent_id).map(str::to_string);

    match state.files.list_dir(&req.path, req.include_hidden).await {
        Ok(listing) => {
            let path = listing.path.display().to_string();
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::LIST_DIR,
                json!({
                    "path": path,
                    "include_hidden": req.include_hidden,
                    "entries": listing.entries.len(),
                }),
                true,
            )
            .await;

            Ok(Json(ListDirResponse {
                success: true,
                entries: listing.entries,
                path,
                agent_id,
            }))
        }
        Err(err) => {
            tracing::warn!(path = %req.path, error = %err, "list_dir failed");
            audit(
                &state,
                agent_id.as_deref(),
                operation_types::LIST_DIR,
                json!({"path": req.path, "error": err.to_string()}),
                false,
            )
            .await;
            Err(ApiError::from_dir_error(err))
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/write_file", post(write_file))
        .route("/read_file", post(read_file))
        .route("/list_dir", post(list_dir))
}

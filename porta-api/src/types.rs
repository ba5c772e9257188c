//! API Request and Response Types

use porta_core::{Agent, DirEntry, OperationRecord, PipelineStep, Timestamp};
use serde::{Deserialize, Serialize};

/// Trimmed caller-supplied agent id, `None` when absent or blank.
pub fn caller_agent(agent_id: &Option<String>) -> Option<&str> {
    agent_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

// ============================================================================
// SERVICE INFO TYPES
// ============================================================================

/// One entry of the method catalogue served at `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub description: String,
    pub endpoint: String,
    pub method: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub name: String,
    pub description: String,
    pub version: String,
    pub security: String,
    pub methods: Vec<MethodDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Whole seconds since process start.
    pub uptime: u64,
    pub pid: u32,
    pub port: u16,
    pub security: String,
    pub endpoints: Vec<String>,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUrlResponse {
    pub public_url: Option<String>,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: Timestamp,
}

// ============================================================================
// AGENT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatusRequest {
    pub agent_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatusResponse {
    pub status: String,
    pub agent_id: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentListRequest {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// `active` or `inactive`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentListResponse {
    pub agents: Vec<Agent>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentHistoryRequest {
    pub agent_id: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub operation_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentHistoryResponse {
    pub agent_id: String,
    pub operations: Vec<OperationRecord>,
    /// Number of records returned.
    pub total: usize,
}

// ============================================================================
// COMMAND TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunBashRequest {
    pub cmd: String,
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunBashResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub agent_id: String,
    pub commands: Vec<String>,
    /// Per-step timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResponse {
    pub success: bool,
    pub agent_id: String,
    pub total_commands: usize,
    pub executed_commands: usize,
    /// Wall-clock seconds.
    pub execution_time: f64,
    pub results: Vec<PipelineStep>,
}

// ============================================================================
// FILE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFileRequest {
    pub path: String,
    pub content: String,
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFileResponse {
    pub success: bool,
    pub message: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadFileRequest {
    pub path: String,
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadFileResponse {
    pub success: bool,
    pub content: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDirRequest {
    pub path: String,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDirResponse {
    pub success: bool,
    pub entries: Vec<DirEntry>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

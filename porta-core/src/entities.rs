//! Ledger entities, execution results and directory listings.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::enums::AgentStatus;
use crate::identity::{AgentId, SequenceId, Timestamp};

/// Well-known `operation_type` tags written by the gateway.
pub mod operation_types {
    pub const AGENT_STATUS: &str = "agent_status";
    pub const RUN_BASH: &str = "run_bash";
    pub const WRITE_FILE: &str = "write_file";
    pub const READ_FILE: &str = "read_file";
    pub const LIST_DIR: &str = "list_dir";
    pub const PIPELINE: &str = "pipeline";
}

// ============================================================================
// AGENT
// ============================================================================

/// An agent identity as tracked by the ledger.
///
/// Created on the first recorded operation for an id. The gateway never
/// deletes agents; only the ledger's upsert and append paths mutate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub display_name: String,
    pub created_at: Timestamp,
    pub last_seen_at: Timestamp,
    pub operation_count: u64,
    pub status: AgentStatus,
}

impl Agent {
    /// A fresh agent first seen at `now`. The display name defaults to the id.
    pub fn new(id: impl Into<AgentId>, display_name: Option<&str>, now: Timestamp) -> Self {
        let id = id.into();
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        Self {
            id,
            display_name,
            created_at: now,
            last_seen_at: now,
            operation_count: 0,
            status: AgentStatus::Active,
        }
    }

    /// Refresh `last_seen_at`, and the display name when one is supplied.
    ///
    /// `last_seen_at` never moves backwards.
    pub fn touch(&mut self, now: Timestamp, display_name: Option<&str>) {
        if now > self.last_seen_at {
            self.last_seen_at = now;
        }
        if let Some(name) = display_name.filter(|name| !name.trim().is_empty()) {
            self.display_name = name.to_string();
        }
    }
}

// ============================================================================
// OPERATION LOG
// ============================================================================

/// Payload attached to an operation record.
///
/// Stored as serialized text. On read, text that parses as a JSON object
/// becomes `Structured`; anything else is kept verbatim as `Raw`.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationDetail {
    Structured(Map<String, Value>),
    Raw(String),
}

impl OperationDetail {
    /// Build a detail from any JSON value. Non-object values are wrapped
    /// under a `value` key so that the detail is always an object.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => OperationDetail::Structured(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                OperationDetail::Structured(map)
            }
        }
    }

    /// Decode stored detail text.
    pub fn from_stored(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => OperationDetail::Structured(map),
            _ => OperationDetail::Raw(text.to_string()),
        }
    }

    /// Encode for storage. `Raw` text is stored unchanged.
    pub fn to_stored(&self) -> String {
        match self {
            OperationDetail::Structured(map) => Value::Object(map.clone()).to_string(),
            OperationDetail::Raw(text) => text.clone(),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, OperationDetail::Raw(_))
    }
}

impl Default for OperationDetail {
    fn default() -> Self {
        OperationDetail::Structured(Map::new())
    }
}

impl Serialize for OperationDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OperationDetail::Structured(map) => map.serialize(serializer),
            OperationDetail::Raw(text) => {
                let mut map = Map::new();
                map.insert("raw".to_string(), Value::String(text.clone()));
                map.serialize(serializer)
            }
        }
    }
}

/// An operation about to be appended to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOperation {
    pub agent_id: AgentId,
    pub operation_type: String,
    pub detail: OperationDetail,
    pub success: bool,
    pub timestamp: Timestamp,
}

/// On-disk shape of an operation record. `detail` stays as text so that a
/// malformed payload survives storage untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOperation {
    pub sequence_id: SequenceId,
    pub agent_id: AgentId,
    pub operation_type: String,
    pub detail: String,
    pub timestamp: Timestamp,
    pub success: bool,
}

impl StoredOperation {
    pub fn from_new(sequence_id: SequenceId, op: &NewOperation) -> Self {
        Self {
            sequence_id,
            agent_id: op.agent_id.clone(),
            operation_type: op.operation_type.clone(),
            detail: op.detail.to_stored(),
            timestamp: op.timestamp,
            success: op.success,
        }
    }

    pub fn into_record(self) -> OperationRecord {
        OperationRecord {
            detail: OperationDetail::from_stored(&self.detail),
            sequence_id: self.sequence_id,
            agent_id: self.agent_id,
            operation_type: self.operation_type,
            timestamp: self.timestamp,
            success: self.success,
        }
    }
}

/// Immutable audit entry as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    pub sequence_id: SequenceId,
    pub agent_id: AgentId,
    pub operation_type: String,
    pub detail: OperationDetail,
    pub timestamp: Timestamp,
    pub success: bool,
}

// ============================================================================
// EXECUTION RESULTS
// ============================================================================

/// Captured result of one shell command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// Why a pipeline step produced no exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepError {
    Timeout,
    Exception,
}

/// Outcome of one executed pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub command: String,
    pub index: usize,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Process exit code, or `-1` when the step timed out or failed to run.
    pub return_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl PipelineStep {
    /// Sentinel return code for steps without a process exit status.
    pub const NO_EXIT_CODE: i32 = -1;

    pub fn completed(index: usize, command: &str, output: CommandOutput) -> Self {
        Self {
            command: command.to_string(),
            index,
            success: output.success,
            stdout: output.stdout,
            stderr: output.stderr,
            return_code: output.exit_code,
            error: None,
        }
    }

    pub fn failed(index: usize, command: &str, error: StepError, stderr: String) -> Self {
        Self {
            command: command.to_string(),
            index,
            success: false,
            stdout: String::new(),
            stderr,
            return_code: Self::NO_EXIT_CODE,
            error: Some(error),
        }
    }
}

/// Aggregate result of a sequential pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub success: bool,
    pub results: Vec<PipelineStep>,
    pub executed_count: usize,
    pub total_count: usize,
    pub elapsed: Duration,
}

// ============================================================================
// DIRECTORY LISTING
// ============================================================================

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

/// An immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl DirEntry {
    /// Directories first, then case-insensitive name.
    pub fn sort_listing(entries: &mut [DirEntry]) {
        entries.sort_by(|a, b| {
            (a.kind != EntryKind::Dir, a.name.to_lowercase())
                .cmp(&(b.kind != EntryKind::Dir, b.name.to_lowercase()))
        });
    }
}

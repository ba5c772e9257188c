//! Error Types for the Porta API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - Conversions from the gateway's filesystem and execution errors
//!
//! Every error is serialized as `{"error": "...", "code": "..."}` with the
//! status code its `ErrorCode` maps to.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use porta_core::{AgentStatusParseError, ExecError, FsError, PortaError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// No token header was presented
    Unauthorized,

    /// A token was presented but does not match
    InvalidToken,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body or query is unusable
    InvalidInput,

    /// Path failed the traversal or deny-list check
    InvalidPath,

    /// Path exists but is not a regular file
    NotAFile,

    /// Path exists but is not a directory
    NotADirectory,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// File or directory does not exist
    NotFound,

    // ========================================================================
    // Timeout (408)
    // ========================================================================
    /// Command exceeded its wall-clock bound
    RequestTimeout,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Interpreter could not run the command
    ExecutionError,

    /// File content is not valid text
    DecodeError,

    /// Filesystem refused access
    PermissionDenied,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,

            ErrorCode::InvalidInput
            | ErrorCode::InvalidPath
            | ErrorCode::NotAFile
            | ErrorCode::NotADirectory => StatusCode::BAD_REQUEST,

            ErrorCode::NotFound => StatusCode::NOT_FOUND,

            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,

            ErrorCode::ExecutionError
            | ErrorCode::DecodeError
            | ErrorCode::PermissionDenied
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Missing X-PORTA-TOKEN header",
            ErrorCode::InvalidToken => "Invalid token",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidPath => "Invalid path",
            ErrorCode::NotAFile => "Path is not a file",
            ErrorCode::NotADirectory => "Path is not a directory",
            ErrorCode::NotFound => "Not found",
            ErrorCode::RequestTimeout => "Command exceeded timeout",
            ErrorCode::ExecutionError => "Command execution failed",
            ErrorCode::DecodeError => "Failed to read file: invalid encoding",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Human-readable error message
    #[serde(rename = "error")]
    pub message: String,

    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Optional additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create an InvalidInput error for a blank required field.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::InvalidInput,
            format!("Required field '{}' is missing", field),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Map a filesystem error raised while listing a directory.
    pub fn from_dir_error(err: FsError) -> Self {
        match err {
            FsError::NotFound { .. } => Self::new(ErrorCode::NotFound, "Directory not found"),
            FsError::Permission { .. } => {
                Self::new(ErrorCode::PermissionDenied, "No permission to read directory")
            }
            FsError::Io { reason, .. } => {
                Self::internal_error(format!("Failed to read directory: {}", reason))
            }
            other => Self::from(other),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// File-oriented messages. Directory listings go through
/// `ApiError::from_dir_error` instead.
impl From<FsError> for ApiError {
    fn from(err: FsError) -> Self {
        match err {
            FsError::InvalidPath { .. } => Self::from_code(ErrorCode::InvalidPath),
            FsError::NotFound { .. } => Self::new(ErrorCode::NotFound, "File not found"),
            FsError::NotAFile { .. } => Self::from_code(ErrorCode::NotAFile),
            FsError::NotADirectory { .. } => Self::from_code(ErrorCode::NotADirectory),
            FsError::Decode { .. } => Self::from_code(ErrorCode::DecodeError),
            FsError::Permission { .. } => {
                Self::new(ErrorCode::PermissionDenied, "No permission to access file")
            }
            FsError::Io { reason, .. } => Self::internal_error(format!("File operation failed: {}", reason)),
        }
    }
}

impl From<ExecError> for ApiError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Timeout { .. } => Self::new(ErrorCode::RequestTimeout, err.to_string()),
            ExecError::Execution { .. } => Self::new(ErrorCode::ExecutionError, err.to_string()),
        }
    }
}

impl From<PortaError> for ApiError {
    fn from(err: PortaError) -> Self {
        match err {
            PortaError::Fs(e) => e.into(),
            PortaError::Exec(e) => e.into(),
            PortaError::Storage(e) => Self::internal_error(format!("Ledger error: {}", e)),
            PortaError::Config(e) => Self::internal_error(e.to_string()),
        }
    }
}

impl From<AgentStatusParseError> for ApiError {
    fn from(err: AgentStatusParseError) -> Self {
        Self::invalid_input(err.to_string())
    }
}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        }
        (status, Json(self)).into_response()
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::InvalidPath.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotAFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::RequestTimeout.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            ErrorCode::DecodeError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_fs_error_conversion() {
        let err: ApiError = FsError::InvalidPath {
            path: "../x".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidPath);
        assert_eq!(err.message, "Invalid path");

        let err: ApiError = FsError::NotFound {
            path: "/tmp/x".into(),
        }
        .into();
        assert_eq!(err.message, "File not found");

        let err = ApiError::from_dir_error(FsError::NotFound {
            path: "/tmp/x".into(),
        });
        assert_eq!(err.message, "Directory not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from_dir_error(FsError::NotADirectory {
            path: "/tmp/x".into(),
        });
        assert_eq!(err.code, ErrorCode::NotADirectory);
    }

    #[test]
    fn test_exec_error_conversion() {
        let err: ApiError = ExecError::Timeout {
            timeout: Duration::from_secs(30),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert!(err.message.contains("30"));

        let err: ApiError = ExecError::Execution {
            reason: "no shell".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ExecutionError);
        assert!(err.message.contains("no shell"));
    }

    #[test]
    fn test_error_body_shape() -> Result<(), serde_json::Error> {
        let err = ApiError::from_code(ErrorCode::InvalidToken);
        let json = serde_json::to_value(&err)?;
        assert_eq!(json["error"], "Invalid token");
        assert_eq!(json["code"], "INVALID_TOKEN");
        assert!(json.get("details").is_none());

        let deserialized: ApiError = serde_json::from_value(json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_missing_field_names_field() -> Result<(), serde_json::Error> {
        let err = ApiError::missing_field("agent_id");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&err)?;
        assert_eq!(json["details"]["field"], "agent_id");
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::internal_error("Ledger unavailable");
        let display = format!("{}", err);
        assert!(display.contains("InternalError"));
        assert!(display.contains("Ledger unavailable"));
    }
}

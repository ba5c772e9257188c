//! Error types for Porta operations

use std::time::Duration;
use thiserror::Error;

/// Ledger storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend failure during {operation}: {reason}")]
    Backend { operation: String, reason: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn backend(operation: &str, reason: impl ToString) -> Self {
        StorageError::Backend {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn serialization(reason: impl ToString) -> Self {
        StorageError::Serialization {
            reason: reason.to_string(),
        }
    }
}

/// Filesystem accessor errors.
///
/// `InvalidPath` is always raised before the filesystem is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsError {
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Path not found: {path}")]
    NotFound { path: String },

    #[error("Path is not a file: {path}")]
    NotAFile { path: String },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("File is not valid UTF-8 text: {path}")]
    Decode { path: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },
}

impl FsError {
    /// Map an `io::Error` raised while accessing `path`.
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => FsError::Permission {
                path: path.to_string(),
            },
            std::io::ErrorKind::InvalidData => FsError::Decode {
                path: path.to_string(),
            },
            _ => FsError::Io {
                path: path.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

/// Command execution errors. A non-zero exit status is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("Command exceeded timeout of {}s", timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    #[error("Command execution failed: {reason}")]
    Execution { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Porta errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortaError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Filesystem error: {0}")]
    Fs(#[from] FsError),

    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Porta operations.
pub type PortaResult<T> = Result<T, PortaError>;

// =============================================================================
// TESTS
// =============================================================================

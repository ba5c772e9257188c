//! Porta Core - Entity Types
//!
//! Pure data structures shared by every Porta crate: the agent ledger
//! entities, command and pipeline results, directory listings, the query
//! filters used for pagination, and the error taxonomy.
//!
//! This crate contains no I/O. Storage lives in `porta-storage`, and the
//! gateway behaviour (sanitizing, executing, listing) lives in `porta-gateway`.

pub mod clock;
pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod identity;

pub use clock::{Clock, FixedClock, ProcessClock, SystemClock};
pub use entities::{
    operation_types, Agent, CommandOutput, DirEntry, EntryKind, NewOperation, OperationDetail,
    OperationRecord, PipelineResult, PipelineStep, StepError, StoredOperation,
};
pub use enums::{AgentStatus, AgentStatusParseError};
pub use error::{ConfigError, ExecError, FsError, PortaError, PortaResult, StorageError};
pub use filter::{
    clamp_limit, AgentPage, AgentQuery, HistoryQuery, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use identity::{AgentId, SequenceId, Timestamp};

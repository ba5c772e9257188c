//! Porta Gateway - Agent Operation Core
//!
//! Every inbound operation flows through the pieces in this crate:
//!
//! 1. `AccessGuard` decides whether the request's token is acceptable
//! 2. `PathSanitizer` validates and resolves filesystem paths (file ops only)
//! 3. `FileAccessor`, `CommandExecutor` or `PipelineRunner` does the work
//! 4. `AgentLedger` records who did it, best-effort
//!
//! Nothing here knows about HTTP. The axum binding lives in `porta-api`.

pub mod access;
pub mod exec;
pub mod fs;
pub mod ledger;
pub mod path;
pub mod pipeline;

pub use access::{AccessDecision, AccessGuard, AccessToken, RejectReason, TOKEN_HEADER};
pub use exec::{CommandExecutor, DEFAULT_SHELL};
pub use fs::{DirListing, FileAccessor, FileContent};
pub use ledger::{AgentLedger, RecordOutcome};
pub use path::{PathSanitizer, PathScope, DENIED_PREFIXES, LISTING_DENIED_PREFIXES};
pub use pipeline::PipelineRunner;

//! Identity and time types.

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Externally supplied agent identifier. Agents name themselves.
pub type AgentId = String;

/// Ledger-assigned position of an operation record. Strictly increasing,
/// never reused, starts at 1.
pub type SequenceId = u64;

//! Async storage trait for the agent ledger.

use ::async_trait::async_trait;
use porta_core::{
    Agent, AgentPage, AgentQuery, HistoryQuery, NewOperation, OperationRecord, PortaResult,
    SequenceId, Timestamp,
};

/// Backing store for agent identities and the operation log.
///
/// Registration and appends are independent calls. A caller doing both
/// accepts that one may succeed while the other fails.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ========================================================================
    // AGENT OPERATIONS
    // ========================================================================

    /// Insert the agent if absent, otherwise refresh `last_seen_at` (and the
    /// display name when given). Never creates a duplicate identity and never
    /// changes `operation_count`.
    async fn agent_upsert(
        &self,
        agent_id: &str,
        display_name: Option<&str>,
        now: Timestamp,
    ) -> PortaResult<Agent>;

    /// Get an agent by id.
    async fn agent_get(&self, agent_id: &str) -> PortaResult<Option<Agent>>;

    /// List agents, most recently seen first.
    async fn agent_list(&self, query: &AgentQuery) -> PortaResult<AgentPage>;

    // ========================================================================
    // OPERATION LOG
    // ========================================================================

    /// Append an immutable operation record and return its sequence id.
    ///
    /// In the same transaction: assigns the next sequence id, creates the
    /// agent when it does not exist yet, increments its `operation_count`
    /// and refreshes `last_seen_at`.
    async fn operation_append(&self, op: &NewOperation) -> PortaResult<SequenceId>;

    /// An agent's operations, newest first.
    async fn operation_history(&self, query: &HistoryQuery) -> PortaResult<Vec<OperationRecord>>;
}

//! Porta Storage - Agent Ledger Persistence
//!
//! The ledger keeps two collections: agent identities and an append-only
//! operation log. `LedgerStore` is the async seam the gateway talks to.
//! Two implementations ship here:
//!
//! - `LmdbLedger`: persistent, memory-mapped store (heed/LMDB). Every write
//!   runs in a single LMDB write transaction, so sequence assignment and the
//!   agent's operation counter never race.
//! - `MockLedger`: in-memory store with the same semantics, for tests.

pub mod lmdb;
pub mod mock;
pub mod store;

pub use lmdb::LmdbLedger;
pub use mock::MockLedger;
pub use store::LedgerStore;

use porta_core::{Agent, AgentPage, AgentQuery, HistoryQuery, OperationRecord, StoredOperation};

/// Filter, order (`last_seen_at` descending, id ascending on ties) and page
/// a full set of agents.
pub(crate) fn paginate_agents(mut agents: Vec<Agent>, query: &AgentQuery) -> AgentPage {
    agents.retain(|agent| query.matches(agent));
    agents.sort_by(|a, b| {
        b.last_seen_at
            .cmp(&a.last_seen_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    let total = agents.len();
    let agents = agents
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .collect();
    AgentPage { agents, total }
}

/// Order an agent's matching operations newest first and apply the limit.
///
/// Ties on timestamp fall back to sequence order.
pub(crate) fn order_history(
    mut operations: Vec<StoredOperation>,
    query: &HistoryQuery,
) -> Vec<OperationRecord> {
    operations.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.sequence_id.cmp(&a.sequence_id))
    });
    operations
        .into_iter()
        .take(query.limit)
        .map(StoredOperation::into_record)
        .collect()
}

//! Query filters and pagination for ledger reads.

use serde::{Deserialize, Serialize};

use crate::entities::Agent;
use crate::enums::AgentStatus;
use crate::identity::AgentId;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Upper bound on any single page.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Clamp a requested page size into `1..=MAX_PAGE_LIMIT`.
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

/// Filter for listing agents, ordered by `last_seen_at` descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentQuery {
    pub limit: usize,
    pub offset: usize,
    pub status: Option<AgentStatus>,
}

impl AgentQuery {
    pub fn new(limit: Option<usize>, offset: Option<usize>, status: Option<AgentStatus>) -> Self {
        Self {
            limit: clamp_limit(limit),
            offset: offset.unwrap_or(0),
            status,
        }
    }

    pub fn matches(&self, agent: &Agent) -> bool {
        self.status.map_or(true, |status| agent.status == status)
    }
}

impl Default for AgentQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// One page of agents plus the number of agents matching the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPage {
    pub agents: Vec<Agent>,
    pub total: usize,
}

/// Filter for an agent's operation history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub agent_id: AgentId,
    pub limit: usize,
    pub operation_type: Option<String>,
}

impl HistoryQuery {
    pub fn new(
        agent_id: impl Into<AgentId>,
        limit: Option<usize>,
        operation_type: Option<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            limit: clamp_limit(limit),
            operation_type: operation_type.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn matches_type(&self, operation_type: &str) -> bool {
        self.operation_type
            .as_deref()
            .map_or(true, |wanted| wanted == operation_type)
    }
}

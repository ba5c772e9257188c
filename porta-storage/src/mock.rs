//! In-memory ledger for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use porta_core::{
    Agent, AgentPage, AgentQuery, HistoryQuery, NewOperation, OperationRecord, PortaResult,
    SequenceId, StorageError, StoredOperation, Timestamp,
};

use crate::store::LedgerStore;
use crate::{order_history, paginate_agents};

#[derive(Debug, Default)]
struct MockInner {
    agents: HashMap<String, Agent>,
    operations: Vec<StoredOperation>,
    last_sequence: SequenceId,
}

/// In-memory `LedgerStore`. One mutex guards both collections, which gives
/// the same single-writer behaviour as the LMDB backend.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    inner: Arc<Mutex<MockInner>>,
}

impl MockLedger {
    /// Create a new, empty mock ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortaResult<MutexGuard<'_, MockInner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    /// Number of distinct agents.
    pub fn agent_count(&self) -> PortaResult<usize> {
        Ok(self.lock()?.agents.len())
    }

    /// Number of operation records.
    pub fn operation_count(&self) -> PortaResult<usize> {
        Ok(self.lock()?.operations.len())
    }

    /// Replace an agent record wholesale. Test hook for states the gateway
    /// never produces itself, such as inactive agents.
    pub fn put_agent(&self, agent: Agent) -> PortaResult<()> {
        self.lock()?.agents.insert(agent.id.clone(), agent);
        Ok(())
    }

    /// Insert a stored operation verbatim, bypassing detail encoding.
    pub fn put_raw_operation(&self, op: StoredOperation) -> PortaResult<()> {
        let mut inner = self.lock()?;
        inner.last_sequence = inner.last_sequence.max(op.sequence_id);
        inner.operations.push(op);
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MockLedger {
    async fn agent_upsert(
        &self,
        agent_id: &str,
        display_name: Option<&str>,
        now: Timestamp,
    ) -> PortaResult<Agent> {
        let mut inner = self.lock()?;
        let agent = inner
            .agents
            .entry(agent_id.to_string())
            .and_modify(|agent| agent.touch(now, display_name))
            .or_insert_with(|| Agent::new(agent_id, display_name, now));
        Ok(agent.clone())
    }

    async fn agent_get(&self, agent_id: &str) -> PortaResult<Option<Agent>> {
        Ok(self.lock()?.agents.get(agent_id).cloned())
    }

    async fn agent_list(&self, query: &AgentQuery) -> PortaResult<AgentPage> {
        let agents = self.lock()?.agents.values().cloned().collect();
        Ok(paginate_agents(agents, query))
    }

    async fn operation_append(&self, op: &NewOperation) -> PortaResult<SequenceId> {
        let mut inner = self.lock()?;
        let sequence_id = inner.last_sequence + 1;

        let agent = inner
            .agents
            .entry(op.agent_id.clone())
            .or_insert_with(|| Agent::new(op.agent_id.as_str(), None, op.timestamp));
        agent.touch(op.timestamp, None);
        agent.operation_count += 1;

        inner.operations.push(StoredOperation::from_new(sequence_id, op));
        inner.last_sequence = sequence_id;
        Ok(sequence_id)
    }

    async fn operation_history(&self, query: &HistoryQuery) -> PortaResult<Vec<OperationRecord>> {
        let matching = self
            .lock()?
            .operations
            .iter()
            .filter(|op| op.agent_id == query.agent_id && query.matches_type(&op.operation_type))
            .cloned()
            .collect();
        Ok(order_history(matching, query))
    }
}

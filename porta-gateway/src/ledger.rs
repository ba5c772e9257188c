//! Agent ledger facade over a `LedgerStore`.
//!
//! Stamps writes with the injected clock and offers `record`, the
//! best-effort register-then-append used by every audited operation.

use std::sync::Arc;

use porta_core::{
    Agent, AgentPage, AgentQuery, Clock, HistoryQuery, NewOperation, OperationDetail,
    OperationRecord, PortaResult, SequenceId, SystemClock, Timestamp,
};
use porta_storage::LedgerStore;

/// What `AgentLedger::record` managed to persist. A `false`/`None` field
/// means that stage failed and was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordOutcome {
    pub registered: bool,
    pub sequence_id: Option<SequenceId>,
}

#[derive(Clone)]
pub struct AgentLedger {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AgentLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLedger").finish_non_exhaustive()
    }
}

impl AgentLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Current time on the ledger's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Idempotent upsert of an agent identity.
    pub async fn register(&self, agent_id: &str, display_name: Option<&str>) -> PortaResult<Agent> {
        self.store
            .agent_upsert(agent_id, display_name, self.clock.now())
            .await
    }

    /// Append one immutable operation record.
    pub async fn append_operation(
        &self,
        agent_id: &str,
        operation_type: &str,
        detail: OperationDetail,
        success: bool,
    ) -> PortaResult<SequenceId> {
        let op = NewOperation {
            agent_id: agent_id.to_string(),
            operation_type: operation_type.to_string(),
            detail,
            success,
            timestamp: self.clock.now(),
        };
        self.store.operation_append(&op).await
    }

    /// Register the agent, then append the operation. The two stages fail
    /// independently; failures are logged and never returned.
    pub async fn record(
        &self,
        agent_id: &str,
        operation_type: &str,
        detail: OperationDetail,
        success: bool,
    ) -> RecordOutcome {
        let registered = match self.register(agent_id, None).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(agent_id, operation_type, error = %e, "Agent registration failed");
                false
            }
        };

        let sequence_id = match self
            .append_operation(agent_id, operation_type, detail, success)
            .await
        {
            Ok(seq) => {
                tracing::debug!(agent_id, operation_type, sequence_id = seq, "Operation recorded");
                Some(seq)
            }
            Err(e) => {
                tracing::warn!(agent_id, operation_type, error = %e, "Operation append failed");
                None
            }
        };

        RecordOutcome {
            registered,
            sequence_id,
        }
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub async fn get_agent(&self, agent_id: &str) -> PortaResult<Option<Agent>> {
        self.store.agent_get(agent_id).await
    }

    /// One page of agents, most recently seen first, plus the filtered total.
    pub async fn list_agents(&self, query: &AgentQuery) -> PortaResult<AgentPage> {
        self.store.agent_list(query).await
    }

    pub async fn history(&self, query: &HistoryQuery) -> PortaResult<Vec<OperationRecord>> {
        self.store.operation_history(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use porta_core::{operation_types, AgentStatus, FixedClock, StorageError};
    use porta_storage::MockLedger;
    use porta_test_utils::assertions::{assert_newest_first, assert_strictly_increasing};
    use porta_test_utils::fixtures::{sample_detail, sample_operation, seeded_ledger, test_timestamp};
    use porta_test_utils::generators::{arb_agent_id, arb_operation_type, arb_timestamp};
    use proptest::prelude::*;
    use serde_json::json;
    use tokio::runtime::Runtime;

    fn ledger(store: MockLedger) -> AgentLedger {
        AgentLedger::with_clock(Arc::new(store), Arc::new(FixedClock(test_timestamp())))
    }

    /// Store whose every call fails, to exercise the swallow path.
    struct FailingStore;

    fn broken() -> porta_core::PortaError {
        StorageError::backend("test", "disk on fire").into()
    }

    #[async_trait]
    impl LedgerStore for FailingStore {
        async fn agent_upsert(&self, _: &str, _: Option<&str>, _: Timestamp) -> PortaResult<Agent> {
            Err(broken())
        }
        async fn agent_get(&self, _: &str) -> PortaResult<Option<Agent>> {
            Err(broken())
        }
        async fn agent_list(&self, _: &AgentQuery) -> PortaResult<AgentPage> {
            Err(broken())
        }
        async fn operation_append(&self, _: &NewOperation) -> PortaResult<SequenceId> {
            Err(broken())
        }
        async fn operation_history(&self, _: &HistoryQuery) -> PortaResult<Vec<OperationRecord>> {
            Err(broken())
        }
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let store = MockLedger::new();
        let ledger = ledger(store.clone());
        ledger.register("bot", Some("Bot")).await.unwrap();
        let again = ledger.register("bot", None).await.unwrap();

        assert_eq!(store.agent_count().unwrap(), 1);
        assert_eq!(again.display_name, "Bot");
        assert_eq!(again.operation_count, 0);
        assert_eq!(again.created_at, test_timestamp());
    }

    #[tokio::test]
    async fn test_record_counts_each_operation_once() {
        let store = MockLedger::new();
        let ledger = ledger(store.clone());
        for _ in 0..3 {
            let outcome = ledger
                .record("bot", operation_types::RUN_BASH, sample_detail(), true)
                .await;
            assert!(outcome.registered);
            assert!(outcome.sequence_id.is_some());
        }

        let agent = ledger.get_agent("bot").await.unwrap().unwrap();
        assert_eq!(agent.operation_count, 3);
        assert_eq!(store.agent_count().unwrap(), 1);
        assert_eq!(store.operation_count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_append_returns_increasing_sequences() {
        let ledger = ledger(MockLedger::new());
        let mut last = 0;
        for i in 0..5 {
            let seq = ledger
                .append_operation("bot", "custom", OperationDetail::from_value(json!({ "i": i })), i % 2 == 0)
                .await
                .unwrap();
            assert!(seq > last);
            last = seq;
        }
    }

    #[tokio::test]
    async fn test_history_filters_by_type() {
        let ledger = ledger(MockLedger::new());
        ledger.record("bot", operation_types::RUN_BASH, sample_detail(), true).await;
        ledger.record("bot", operation_types::WRITE_FILE, sample_detail(), true).await;
        ledger.record("other", operation_types::RUN_BASH, sample_detail(), false).await;

        let query = HistoryQuery::new("bot", None, Some(operation_types::RUN_BASH.to_string()));
        let records = ledger.history(&query).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].agent_id, "bot");
        assert_eq!(records[0].operation_type, operation_types::RUN_BASH);
    }

    #[tokio::test]
    async fn test_list_total_by_status() {
        let store = MockLedger::new();
        let ledger = ledger(store.clone());
        ledger.register("a", None).await.unwrap();
        ledger.register("b", None).await.unwrap();
        let mut retired = Agent::new("c", None, test_timestamp());
        retired.status = AgentStatus::Inactive;
        store.put_agent(retired).unwrap();

        for (status, expected) in [
            (None, 3),
            (Some(AgentStatus::Active), 2),
            (Some(AgentStatus::Inactive), 1),
        ] {
            let page = ledger
                .list_agents(&AgentQuery::new(Some(1), None, status))
                .await
                .unwrap();
            assert_eq!(page.total, expected);
            assert_eq!(page.agents.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_record_swallows_storage_failures() {
        let ledger = AgentLedger::new(Arc::new(FailingStore));
        let outcome = ledger
            .record("bot", operation_types::READ_FILE, sample_detail(), true)
            .await;
        assert_eq!(outcome, RecordOutcome::default());
        assert!(ledger.register("bot", None).await.is_err());
    }

    #[tokio::test]
    async fn test_seeded_ledger_reads() {
        let ledger = ledger(seeded_ledger(&["a", "b", "c"], 3).unwrap());

        let page = ledger.list_agents(&AgentQuery::default()).await.unwrap();
        let ids: Vec<_> = page.agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let records = ledger.history(&HistoryQuery::new("b", None, None)).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.agent_id == "b"));
        assert_newest_first(&records);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_appends_sequenced_and_history_newest_first(
            agent_id in arb_agent_id(),
            ops in prop::collection::vec((arb_operation_type(), arb_timestamp()), 1..20),
        ) {
            let store = MockLedger::new();
            let ledger = ledger(store.clone());

            let (sequence_ids, records, agent) = Runtime::new().unwrap().block_on(async {
                let mut sequence_ids = Vec::new();
                for (operation_type, at) in &ops {
                    let mut op = sample_operation(&agent_id, 0);
                    op.operation_type = operation_type.to_string();
                    op.timestamp = *at;
                    sequence_ids.push(store.operation_append(&op).await.unwrap());
                }
                let records = ledger
                    .history(&HistoryQuery::new(agent_id.as_str(), Some(100), None))
                    .await
                    .unwrap();
                let agent = ledger.get_agent(&agent_id).await.unwrap();
                (sequence_ids, records, agent)
            });

            assert_strictly_increasing(&sequence_ids);
            prop_assert_eq!(records.len(), ops.len());
            assert_newest_first(&records);
            prop_assert_eq!(agent.map(|a| a.operation_count), Some(ops.len() as u64));
        }
    }
}

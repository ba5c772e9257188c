//! Porta Test Utilities
//!
//! Shared test infrastructure for the Porta workspace:
//! - Proptest generators for paths, agent ids and directory entry names
//! - Fixtures for timestamps, operation payloads and a seeded ledger
//! - Assertions for listing order, sequence ordering and path rejection

// Re-export mock storage from its source crate
pub use porta_storage::MockLedger;

pub use porta_core::{
    operation_types, Agent, AgentId, AgentStatus, DirEntry, EntryKind, FsError, NewOperation,
    OperationDetail, OperationRecord, PortaResult, SequenceId, StoredOperation, Timestamp,
};

use chrono::{TimeZone, Utc};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Porta inputs.

    use super::*;
    use proptest::prelude::*;

    /// Sensitive absolute prefixes rejected for every file operation.
    const DENIED: &[&str] = &["/etc", "/dev", "/sys"];

    // === Path Generators ===

    /// A path segment with no dots, so it can never form `..`.
    pub fn arb_path_segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_][a-zA-Z0-9_-]{0,11}"
    }

    /// A relative path of one to five plain segments.
    pub fn arb_safe_relative_path() -> impl Strategy<Value = String> {
        prop::collection::vec(arb_path_segment(), 1..5).prop_map(|segments| segments.join("/"))
    }

    /// A path containing `..` somewhere: leading, trailing, in the middle, or
    /// glued inside a segment.
    pub fn arb_traversal_path() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(arb_path_segment(), 0..3),
            prop::collection::vec(arb_path_segment(), 0..3),
            prop_oneof![Just(".."), Just("/.."), Just("../"), Just("x..y")],
            any::<bool>(),
        )
            .prop_map(|(before, after, token, absolute)| {
                let mut path = String::new();
                if absolute {
                    path.push('/');
                }
                path.push_str(&before.join("/"));
                if !before.is_empty() {
                    path.push('/');
                }
                path.push_str(token);
                if !after.is_empty() {
                    path.push('/');
                    path.push_str(&after.join("/"));
                }
                path
            })
    }

    /// A path under one of the always-denied prefixes.
    pub fn arb_denied_path() -> impl Strategy<Value = String> {
        (
            prop::sample::select(DENIED),
            prop::collection::vec(arb_path_segment(), 0..3),
        )
            .prop_map(|(prefix, rest)| {
                if rest.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{}/{}", prefix, rest.join("/"))
                }
            })
    }

    // === Ledger Generators ===

    /// An agent id as callers tend to choose them.
    pub fn arb_agent_id() -> impl Strategy<Value = AgentId> {
        "[a-z][a-z0-9_-]{0,23}"
    }

    /// One of the operation types the gateway records.
    pub fn arb_operation_type() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            operation_types::AGENT_STATUS,
            operation_types::RUN_BASH,
            operation_types::WRITE_FILE,
            operation_types::READ_FILE,
            operation_types::LIST_DIR,
            operation_types::PIPELINE,
        ])
    }

    /// A Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    // === Directory Generators ===

    /// Distinct entry names, some hidden, mixed case.
    pub fn arb_entry_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::hash_set("\\.?[a-zA-Z0-9_]{1,10}", 1..16)
            .prop_map(|names| names.into_iter().collect())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common test scenarios.

    use super::*;
    use serde_json::json;

    /// 2024-01-01T00:00:00Z.
    pub fn test_timestamp() -> Timestamp {
        Utc.timestamp_opt(1_704_067_200, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// `test_timestamp()` shifted by `secs`.
    pub fn timestamp_at(secs: i64) -> Timestamp {
        test_timestamp() + chrono::Duration::seconds(secs)
    }

    /// A small structured payload like the one `run_bash` records.
    pub fn sample_detail() -> OperationDetail {
        OperationDetail::from_value(json!({ "cmd": "echo hi", "exit_code": 0 }))
    }

    /// A successful `run_bash` operation for `agent_id` at `timestamp_at(secs)`.
    pub fn sample_operation(agent_id: &str, secs: i64) -> NewOperation {
        NewOperation {
            agent_id: agent_id.to_string(),
            operation_type: operation_types::RUN_BASH.to_string(),
            detail: sample_detail(),
            success: true,
            timestamp: timestamp_at(secs),
        }
    }

    /// A mock ledger holding `agents`, each with `ops_per_agent` operations.
    ///
    /// Agent `i` was last seen at `timestamp_at(i * 60)`, so later entries in
    /// `agents` are more recent. Operation timestamps and sequence ids both
    /// increase in insertion order.
    pub fn seeded_ledger(agents: &[&str], ops_per_agent: u64) -> PortaResult<MockLedger> {
        let ledger = MockLedger::new();
        let mut sequence_id: SequenceId = 0;

        for (i, agent_id) in agents.iter().enumerate() {
            let seen = timestamp_at(i as i64 * 60);
            let mut agent = Agent::new(*agent_id, None, test_timestamp());
            agent.touch(seen, None);
            agent.operation_count = ops_per_agent;
            ledger.put_agent(agent)?;

            for _ in 0..ops_per_agent {
                sequence_id += 1;
                let op = sample_operation(agent_id, sequence_id as i64);
                ledger.put_raw_operation(StoredOperation::from_new(sequence_id, &op))?;
            }
        }
        Ok(ledger)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for Porta-specific invariants.

    use super::*;

    /// Assert directories come before files and each group is sorted by
    /// lowercase name.
    #[track_caller]
    pub fn assert_listing_sorted(entries: &[DirEntry]) {
        for pair in entries.windows(2) {
            let key = |e: &DirEntry| (e.kind != EntryKind::Dir, e.name.to_lowercase());
            assert!(
                key(&pair[0]) <= key(&pair[1]),
                "Listing out of order: {:?} before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    /// Assert a run of sequence ids is strictly increasing.
    #[track_caller]
    pub fn assert_strictly_increasing(ids: &[SequenceId]) {
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "Sequence not increasing: {:?}", ids);
        }
    }

    /// Assert history records are newest first, ties broken by sequence id.
    #[track_caller]
    pub fn assert_newest_first(records: &[OperationRecord]) {
        for pair in records.windows(2) {
            let newer = (pair[0].timestamp, pair[0].sequence_id);
            let older = (pair[1].timestamp, pair[1].sequence_id);
            assert!(newer > older, "History out of order: {:?} before {:?}", newer, older);
        }
    }

    /// Assert an accessor rejected its path.
    #[track_caller]
    pub fn assert_invalid_path<T: std::fmt::Debug>(result: &Result<T, FsError>) {
        match result {
            Err(FsError::InvalidPath { .. }) => {}
            other => panic!("Expected InvalidPath, got: {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seeded_ledger_shape() {
        let ledger = fixtures::seeded_ledger(&["a", "b", "c"], 2).unwrap();
        assert_eq!(ledger.agent_count().unwrap(), 3);
        assert_eq!(ledger.operation_count().unwrap(), 6);
    }

    #[test]
    fn test_timestamp_fixture_is_stable() {
        assert_eq!(fixtures::test_timestamp(), fixtures::timestamp_at(0));
        assert!(fixtures::timestamp_at(1) > fixtures::test_timestamp());
    }

    #[test]
    fn test_sample_detail_is_structured() {
        assert!(!fixtures::sample_detail().is_raw());
    }

    #[test]
    #[should_panic(expected = "Listing out of order")]
    fn test_listing_assertion_catches_files_first() {
        assertions::assert_listing_sorted(&[
            DirEntry {
                name: "a.txt".into(),
                kind: EntryKind::File,
            },
            DirEntry {
                name: "src".into(),
                kind: EntryKind::Dir,
            },
        ]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_safe_relative_path_is_safe(path in generators::arb_safe_relative_path()) {
            prop_assert!(!path.contains(".."));
            prop_assert!(!path.starts_with('/'));
        }

        #[test]
        fn prop_traversal_path_has_token(path in generators::arb_traversal_path()) {
            prop_assert!(path.contains(".."));
        }

        #[test]
        fn prop_entry_names_never_special(names in generators::arb_entry_names()) {
            prop_assert!(names.iter().all(|n| n != "." && n != ".." && !n.contains('/')));
        }
    }
}

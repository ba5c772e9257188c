//! LMDB-backed agent ledger.
//!
//! Uses the heed crate (Rust bindings for LMDB). Three named databases live
//! in one environment:
//!
//! - `agents`: `sha256(agent_id)` → `Agent` JSON (the full id lives in the value)
//! - `operations`: big-endian sequence id → `StoredOperation` JSON
//! - `agent_operations`: `sha256(agent_id) ‖ sequence id` → operation type
//!
//! Agent ids are caller-supplied and unbounded while LMDB keys are capped at
//! 511 bytes, so agent keys are the fixed-width digest. Every index key has
//! the same 32-byte prefix length, so one agent's prefix cannot match another
//! agent whose id merely starts the same way.
//!
//! # Thread Safety
//!
//! LMDB admits one write transaction at a time. `operation_append` reads the
//! last sequence id, updates the agent row and writes both records inside a
//! single write transaction, so concurrent appends serialize cleanly.
//! Transactions are opened and committed inside synchronous helpers and
//! never held across an `.await`.

use std::path::Path;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use porta_core::{
    Agent, AgentPage, AgentQuery, ConfigError, HistoryQuery, NewOperation, OperationRecord,
    PortaError, PortaResult, SequenceId, StorageError, StoredOperation, Timestamp,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::store::LedgerStore;
use crate::{order_history, paginate_agents};

const AGENTS_DB: &str = "agents";
const OPERATIONS_DB: &str = "operations";
const AGENT_OPERATIONS_DB: &str = "agent_operations";
const AGENT_KEY_LEN: usize = 32;

fn heed_err(operation: &'static str) -> impl Fn(heed::Error) -> PortaError {
    move |e| StorageError::backend(operation, e).into()
}

fn encode<T: Serialize>(value: &T) -> PortaResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StorageError::serialization(e).into())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> PortaResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::serialization(e).into())
}

fn sequence_key(sequence_id: SequenceId) -> [u8; 8] {
    sequence_id.to_be_bytes()
}

fn decode_sequence(bytes: &[u8]) -> PortaResult<SequenceId> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StorageError::serialization("sequence key is not 8 bytes"))?;
    Ok(SequenceId::from_be_bytes(raw))
}

fn agent_key(agent_id: &str) -> [u8; AGENT_KEY_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(agent_id.as_bytes());
    let mut key = [0u8; AGENT_KEY_LEN];
    key.copy_from_slice(&hasher.finalize());
    key
}

fn index_key(agent_id: &str, sequence_id: SequenceId) -> [u8; AGENT_KEY_LEN + 8] {
    let mut key = [0u8; AGENT_KEY_LEN + 8];
    key[..AGENT_KEY_LEN].copy_from_slice(&agent_key(agent_id));
    key[AGENT_KEY_LEN..].copy_from_slice(&sequence_key(sequence_id));
    key
}

fn map_size_bytes(max_size_mb: usize) -> PortaResult<usize> {
    max_size_mb
        .checked_mul(1024 * 1024)
        .filter(|bytes| *bytes > 0)
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "ledger map size".to_string(),
                value: format!("{} MB", max_size_mb),
                reason: "must be between 1 MB and the addressable maximum".to_string(),
            }
            .into()
        })
}

/// Persistent ledger stored in an LMDB environment directory.
#[derive(Clone)]
pub struct LmdbLedger {
    env: Env,
    agents: Database<Bytes, Bytes>,
    operations: Database<Bytes, Bytes>,
    agent_operations: Database<Bytes, Bytes>,
}

impl std::fmt::Debug for LmdbLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbLedger")
            .field("path", &self.env.path())
            .finish()
    }
}

impl LmdbLedger {
    /// Open (or create) a ledger in `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory holding the LMDB files; created if missing
    /// * `max_size_mb` - Map size in megabytes
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> PortaResult<Self> {
        let map_size = map_size_bytes(max_size_mb)?;
        std::fs::create_dir_all(&path).map_err(|e| StorageError::backend("create_dir", e))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(3)
                .open(path.as_ref())
        }
        .map_err(heed_err("open_env"))?;

        let mut wtxn = env.write_txn().map_err(heed_err("open_txn"))?;
        let agents = env
            .create_database(&mut wtxn, Some(AGENTS_DB))
            .map_err(heed_err("create_agents_db"))?;
        let operations = env
            .create_database(&mut wtxn, Some(OPERATIONS_DB))
            .map_err(heed_err("create_operations_db"))?;
        let agent_operations = env
            .create_database(&mut wtxn, Some(AGENT_OPERATIONS_DB))
            .map_err(heed_err("create_index_db"))?;
        wtxn.commit().map_err(heed_err("open_commit"))?;

        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB ledger");

        Ok(Self {
            env,
            agents,
            operations,
            agent_operations,
        })
    }

    fn read_agent(&self, txn: &RoTxn, agent_id: &str) -> PortaResult<Option<Agent>> {
        match self
            .agents
            .get(txn, &agent_key(agent_id))
            .map_err(heed_err("agent_get"))?
        {
            Some(bytes) => decode(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn upsert_sync(
        &self,
        agent_id: &str,
        display_name: Option<&str>,
        now: Timestamp,
    ) -> PortaResult<Agent> {
        let mut wtxn = self.env.write_txn().map_err(heed_err("upsert_txn"))?;
        let agent = match self.read_agent(&wtxn, agent_id)? {
            Some(mut existing) => {
                existing.touch(now, display_name);
                existing
            }
            None => Agent::new(agent_id, display_name, now),
        };
        self.agents
            .put(&mut wtxn, &agent_key(agent_id), &encode(&agent)?)
            .map_err(heed_err("agent_put"))?;
        wtxn.commit().map_err(heed_err("upsert_commit"))?;
        Ok(agent)
    }

    fn append_sync(&self, op: &NewOperation) -> PortaResult<SequenceId> {
        let mut wtxn = self.env.write_txn().map_err(heed_err("append_txn"))?;

        let sequence_id = match self
            .operations
            .last(&wtxn)
            .map_err(heed_err("last_sequence"))?
        {
            Some((key, _)) => decode_sequence(key)? + 1,
            None => 1,
        };

        let mut agent = self
            .read_agent(&wtxn, &op.agent_id)?
            .unwrap_or_else(|| Agent::new(op.agent_id.as_str(), None, op.timestamp));
        agent.touch(op.timestamp, None);
        agent.operation_count += 1;

        let stored = StoredOperation::from_new(sequence_id, op);
        self.operations
            .put(&mut wtxn, &sequence_key(sequence_id), &encode(&stored)?)
            .map_err(heed_err("operation_put"))?;
        self.agent_operations
            .put(
                &mut wtxn,
                &index_key(&op.agent_id, sequence_id),
                op.operation_type.as_bytes(),
            )
            .map_err(heed_err("index_put"))?;
        self.agents
            .put(&mut wtxn, &agent_key(&op.agent_id), &encode(&agent)?)
            .map_err(heed_err("agent_put"))?;

        wtxn.commit().map_err(heed_err("append_commit"))?;
        Ok(sequence_id)
    }

    fn list_sync(&self, query: &AgentQuery) -> PortaResult<AgentPage> {
        let rtxn = self.env.read_txn().map_err(heed_err("list_txn"))?;
        let mut agents = Vec::new();
        for entry in self.agents.iter(&rtxn).map_err(heed_err("agent_iter"))? {
            let (_, bytes) = entry.map_err(heed_err("agent_iter"))?;
            agents.push(decode::<Agent>(bytes)?);
        }
        Ok(paginate_agents(agents, query))
    }

    fn history_sync(&self, query: &HistoryQuery) -> PortaResult<Vec<OperationRecord>> {
        let rtxn = self.env.read_txn().map_err(heed_err("history_txn"))?;
        let prefix = agent_key(&query.agent_id);

        let mut matching = Vec::new();
        let entries = self
            .agent_operations
            .prefix_iter(&rtxn, &prefix)
            .map_err(heed_err("index_iter"))?;
        for entry in entries {
            let (key, operation_type) = entry.map_err(heed_err("index_iter"))?;
            let type_matches = std::str::from_utf8(operation_type)
                .map(|t| query.matches_type(t))
                .unwrap_or(false);
            if !type_matches {
                continue;
            }
            let sequence_id = decode_sequence(&key[AGENT_KEY_LEN..])?;
            let stored = self
                .operations
                .get(&rtxn, &sequence_key(sequence_id))
                .map_err(heed_err("operation_get"))?;
            match stored {
                Some(bytes) => matching.push(decode::<StoredOperation>(bytes)?),
                None => {
                    tracing::warn!(sequence_id, agent_id = %query.agent_id, "Index points at missing operation");
                }
            }
        }
        Ok(order_history(matching, query))
    }
}

#[async_trait]
impl LedgerStore for LmdbLedger {
    async fn agent_upsert(
        &self,
        agent_id: &str,
        display_name: Option<&str>,
        now: Timestamp,
    ) -> PortaResult<Agent> {
        self.upsert_sync(agent_id, display_name, now)
    }

    async fn agent_get(&self, agent_id: &str) -> PortaResult<Option<Agent>> {
        let rtxn = self.env.read_txn().map_err(heed_err("get_txn"))?;
        self.read_agent(&rtxn, agent_id)
    }

    async fn agent_list(&self, query: &AgentQuery) -> PortaResult<AgentPage> {
        self.list_sync(query)
    }

    async fn operation_append(&self, op: &NewOperation) -> PortaResult<SequenceId> {
        self.append_sync(op)
    }

    async fn operation_history(&self, query: &HistoryQuery) -> PortaResult<Vec<OperationRecord>> {
        self.history_sync(query)
    }
}

//! Application State
//!
//! Shared state for every route handler. Handlers extract either the whole
//! `AppState` or, for read-only routes, the config or ledger alone through
//! `FromRef`.

use std::sync::Arc;

use porta_core::ProcessClock;
use porta_gateway::{
    AccessGuard, AgentLedger, CommandExecutor, FileAccessor, PathSanitizer, PipelineRunner,
};
use porta_storage::LedgerStore;

use crate::config::ApiConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    /// Token check applied by the access middleware.
    pub guard: AccessGuard,
    pub files: FileAccessor,
    pub executor: CommandExecutor,
    pub pipeline: PipelineRunner,
    pub ledger: AgentLedger,
    /// Captured at boot for `/meta` uptime.
    pub process: ProcessClock,
}

crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(AgentLedger, ledger);

impl AppState {
    /// Wire the gateway components from configuration and a ledger backend.
    pub fn new(config: ApiConfig, store: Arc<dyn LedgerStore>) -> Self {
        Self::with_ledger(config, AgentLedger::new(store))
    }

    /// Same as `new`, with a caller-built ledger (tests inject a fixed clock).
    pub fn with_ledger(config: ApiConfig, ledger: AgentLedger) -> Self {
        let guard = AccessGuard::new(config.token.as_ref(), vec![config.public_prefix.clone()]);
        let files = FileAccessor::new(PathSanitizer::new(config.workdir.clone()));
        let executor = CommandExecutor::new(config.shell.clone()).with_working_dir(config.workdir.clone());
        let pipeline = PipelineRunner::new(executor.clone());

        Self {
            config: Arc::new(config),
            guard,
            files,
            executor,
            pipeline,
            ledger,
            process: ProcessClock::start(),
        }
    }
}

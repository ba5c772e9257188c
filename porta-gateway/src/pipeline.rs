//! Sequential, abort-on-first-failure command pipelines.

use std::time::{Duration, Instant};

use porta_core::{ExecError, PipelineResult, PipelineStep, StepError};

use crate::exec::CommandExecutor;

#[derive(Debug, Clone, Default)]
pub struct PipelineRunner {
    executor: CommandExecutor,
}

impl PipelineRunner {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    /// Run `commands` in order, each bounded by `step_timeout`.
    ///
    /// Stops right after the first step that does not succeed; later
    /// commands are never started. Step failures are reported in the result,
    /// never as an error.
    pub async fn run(&self, commands: &[String], step_timeout: Duration) -> PipelineResult {
        let started = Instant::now();
        let mut results = Vec::with_capacity(commands.len());

        for (index, command) in commands.iter().enumerate() {
            let step = match self.executor.execute(command, step_timeout).await {
                Ok(output) => PipelineStep::completed(index, command, output),
                Err(err @ ExecError::Timeout { .. }) => {
                    PipelineStep::failed(index, command, StepError::Timeout, err.to_string())
                }
                Err(err @ ExecError::Execution { .. }) => {
                    PipelineStep::failed(index, command, StepError::Exception, err.to_string())
                }
            };

            let failed = !step.success;
            results.push(step);
            if failed {
                tracing::warn!(
                    index,
                    command = %command,
                    remaining = commands.len() - index - 1,
                    "Pipeline step failed, aborting"
                );
                break;
            }
        }

        let elapsed = started.elapsed();
        PipelineResult {
            success: results.iter().all(|step| step.success),
            executed_count: results.len(),
            total_count: commands.len(),
            results,
            elapsed,
        }
    }
}

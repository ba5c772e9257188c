//! Timeout-bounded shell command execution.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use porta_core::{CommandOutput, ExecError};
use tokio::process::Command;

/// Interpreter used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Runs one command through `<shell> -c` and captures its output.
///
/// A non-zero exit is a normal result. Only a timeout or a failure to run
/// the interpreter at all is an error.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    shell: String,
    working_dir: Option<PathBuf>,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl CommandExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            working_dir: None,
        }
    }

    /// Run commands from `dir` instead of the process working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run `cmd` once, waiting at most `timeout`.
    ///
    /// The child is killed when the timeout fires.
    pub async fn execute(&self, cmd: &str, timeout: Duration) -> Result<CommandOutput, ExecError> {
        tracing::info!(command = %cmd, timeout_secs = timeout.as_secs_f64(), "Executing command");
        let started = Instant::now();

        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| {
            tracing::error!(command = %cmd, error = %e, "Failed to spawn shell");
            ExecError::Execution {
                reason: e.to_string(),
            }
        })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let output = capture(output);
                tracing::info!(
                    command = %cmd,
                    exit_code = output.exit_code,
                    duration_ms = started.elapsed().as_millis(),
                    "Command finished"
                );
                Ok(output)
            }
            Ok(Err(e)) => {
                tracing::error!(command = %cmd, error = %e, "Command execution failed");
                Err(ExecError::Execution {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                tracing::error!(command = %cmd, timeout_secs = timeout.as_secs_f64(), "Command timed out");
                Err(ExecError::Timeout { timeout })
            }
        }
    }
}

/// Decode both streams lossily and trim surrounding whitespace. A process
/// killed by a signal has no exit code and reports `-1`.
fn capture(output: Output) -> CommandOutput {
    let exit_code = output.status.code().unwrap_or(-1);
    CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        exit_code,
        success: output.status.success(),
    }
}

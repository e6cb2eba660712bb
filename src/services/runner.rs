//! External command execution.
//!
//! Runs one external command in a given working directory, capturing exit
//! status, stdout/stderr, and wall time. Output is persisted per
//! invocation as `std-<i>.out` / `std-<i>.err` so repeated invocations in
//! a reused directory do not clobber each other.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::models::ExecutionResult;

/// Seam for dispatching external commands. The orchestrator is written
/// against this trait so sweeps can be exercised in tests without spawning
/// real processes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute `command` in `working_dir`. `invocation` namespaces the
    /// stdout/stderr artifacts within the directory.
    async fn run(&self, command: &str, working_dir: &Path, invocation: usize) -> ExecutionResult;
}

/// Runner backed by real processes via `tokio::process`.
///
/// Failure policy: a non-zero exit marks the result failed but is not an
/// error; a launch failure (bad executable path, permissions, empty
/// command) is caught and converted to a failed result as well. The sweep
/// never crashes because one case could not start.
pub struct ExternalRunner;

#[async_trait]
impl CommandRunner for ExternalRunner {
    async fn run(&self, command: &str, working_dir: &Path, invocation: usize) -> ExecutionResult {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            tracing::error!(command, "refusing to dispatch empty command line");
            return ExecutionResult::launch_failure(command, working_dir, "empty command line");
        };
        let args: Vec<&str> = parts.collect();

        tracing::debug!(command, dir = %working_dir.display(), invocation, "dispatching");

        let started = Instant::now();
        let output = Command::new(program)
            .args(&args)
            .current_dir(working_dir)
            .output()
            .await;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(command, error = %e, "failed to launch command");
                return ExecutionResult::launch_failure(
                    command,
                    working_dir,
                    format!("failed to launch: {}", e),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let stdout_path = persist(working_dir, invocation, "out", &stdout);
        let stderr_path = persist(working_dir, invocation, "err", &stderr);

        let exit_code = output.status.code();
        let failed = !output.status.success();
        if failed {
            tracing::warn!(command, exit_code, elapsed_seconds, "command exited non-zero");
        } else {
            tracing::debug!(command, elapsed_seconds, "command finished");
        }

        ExecutionResult {
            command: command.to_string(),
            working_dir: working_dir.to_path_buf(),
            exit_code,
            stdout,
            stderr,
            stdout_path,
            stderr_path,
            elapsed_seconds,
            failed,
        }
    }
}

/// Write one output stream to its index-suffixed artifact file. Artifact
/// persistence is best-effort; a write failure is logged, not fatal.
fn persist(working_dir: &Path, invocation: usize, ext: &str, content: &str) -> Option<PathBuf> {
    let path = working_dir.join(format!("std-{}.{}", invocation, ext));
    match std::fs::write(&path, content) {
        Ok(()) => Some(path),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not persist output artifact");
            None
        }
    }
}

//! Captured outcome of one external command invocation.

use std::path::{Path, PathBuf};

/// Result of running one external command.
///
/// A non-zero exit or a failed launch marks the result `failed`; the
/// orchestrator decides how to proceed. Runner code never converts these
/// into Rust errors, so a broken case cannot crash the sweep.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The command line as dispatched.
    pub command: String,
    /// Directory the command ran in.
    pub working_dir: PathBuf,
    /// Exit code, `None` when the process could not be launched.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error, or the launch error message.
    pub stderr: String,
    /// Persisted stdout artifact (`std-<i>.out`), if written.
    pub stdout_path: Option<PathBuf>,
    /// Persisted stderr artifact (`std-<i>.err`), if written.
    pub stderr_path: Option<PathBuf>,
    /// Wall time around the process wait.
    pub elapsed_seconds: f64,
    /// True when exit code is non-zero or the launch itself failed.
    pub failed: bool,
}

impl ExecutionResult {
    /// Result for a command that never started (bad executable, empty
    /// command line, permissions).
    pub fn launch_failure(
        command: impl Into<String>,
        working_dir: &Path,
        message: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.to_path_buf(),
            exit_code: None,
            stdout: String::new(),
            stderr: message.into(),
            stdout_path: None,
            stderr_path: None,
            elapsed_seconds: 0.0,
            failed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_failure_is_failed_with_no_exit_code() {
        let result = ExecutionResult::launch_failure("bogus", Path::new("."), "no such file");
        assert!(result.failed);
        assert_eq!(result.exit_code, None);
        assert_eq!(result.stderr, "no such file");
        assert!(result.stdout_path.is_none());
    }
}

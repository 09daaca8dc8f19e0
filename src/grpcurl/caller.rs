//! Subprocess execution seam. The facade only needs `(stdout, stderr)` or a
//! failure for a given command string, so the trait stays that small and
//! tests can substitute a canned executor.

use thiserror::Error;

use super::error::GrpcurlError;

/// Failure of one execution. `text` is shaped so the response classifier can
/// consume it directly: spawn failures and non-zero exits lead with
/// `Command failed: ...`, grpcurl's own complaints pass through verbatim.
#[derive(Debug, Clone, Error)]
#[error("{text}")]
pub struct ExecError {
    pub text: String,
}

impl From<ExecError> for GrpcurlError {
    fn from(err: ExecError) -> Self {
        GrpcurlError::Exec(err.text)
    }
}

pub trait Executor {
    fn execute(&self, command: &str) -> Result<String, ExecError>;
}

/// Default executor: shlex-splits the synthesized command and runs it
/// directly, capturing both output streams. No retries, no timeout; any
/// bound is delegated to grpcurl via `-max-time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl Executor for ShellExecutor {
    fn execute(&self, command: &str) -> Result<String, ExecError> {
        let argv = shlex::split(command).unwrap_or_default();
        let (program, rest) = argv.split_first().ok_or_else(|| ExecError {
            text: format!("Command failed: {command}\nempty command line"),
        })?;
        let output = std::process::Command::new(program)
            .args(rest)
            .output()
            .map_err(|err| ExecError {
                text: format!("Command failed: {command}\n{err}"),
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(ExecError {
                text: format!("Command failed: {command}\n{stderr}"),
            });
        }
        // grpcurl reports RPC and dial failures on stderr with a zero-exit
        // wrapper in some shells; treat any stderr noise as a failure.
        if !stderr.is_empty() {
            return Err(ExecError { text: stderr });
        }
        Ok(stdout)
    }
}

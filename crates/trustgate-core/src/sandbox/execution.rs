//! Deadline-bounded execution of a single code sample.
//!
//! The sample is written to a fresh temporary directory that is removed when
//! [`run_sample`] returns, on every path. The interpreter runs with a cleared
//! environment, null stdin and that directory as its working directory;
//! `kill_on_drop` plus a `tokio::time::timeout` is the only deadline
//! mechanism.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::{SandboxError, SandboxResult};
use crate::config::SandboxConfig;

const SCRIPT_NAME: &str = "sample.py";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Succeeded,
    /// Non-zero exit, or killed by a signal (`exit_code` is `None`).
    Failed { exit_code: Option<i32> },
    TimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub outcome: ExecutionOutcome,
    /// At most `output_cap` characters.
    pub stdout: String,
    /// At most `output_cap` characters.
    pub stderr: String,
    pub elapsed_ms: u64,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == ExecutionOutcome::Succeeded
    }
}

/// Runs a script file under a deadline.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run_file(
        &self,
        script: &Path,
        timeout: Duration,
        output_cap: usize,
    ) -> SandboxResult<ExecutionReport>;
}

/// [`ScriptRunner`] that spawns a real interpreter process.
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    interpreter: String,
}

impl SubprocessRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        Self::new(config.interpreter.clone())
    }
}

#[async_trait]
impl ScriptRunner for SubprocessRunner {
    async fn run_file(
        &self,
        script: &Path,
        timeout: Duration,
        output_cap: usize,
    ) -> SandboxResult<ExecutionReport> {
        let started = Instant::now();
        let workdir = script
            .parent()
            .ok_or_else(|| SandboxError::InvalidConfig("script has no parent directory".into()))?;

        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(script)
            .current_dir(workdir)
            .env_clear()
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }

        let mut child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            interpreter: self.interpreter.clone(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async {
            let (out, err, status) = tokio::join!(
                read_capped(stdout, output_cap),
                read_capped(stderr, output_cap),
                child.wait()
            );
            (out, err, status)
        };

        let finished = tokio::time::timeout(timeout, run).await;
        let (outcome, stdout, stderr) = match finished {
            Ok((out, err, status)) => {
                let status = status?;
                let outcome = if status.success() {
                    ExecutionOutcome::Succeeded
                } else {
                    ExecutionOutcome::Failed {
                        exit_code: status.code(),
                    }
                };
                (outcome, out?, err?)
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "sample exceeded deadline, killing interpreter"
                );
                child.start_kill().ok();
                child.wait().await.ok();
                (ExecutionOutcome::TimedOut, String::new(), String::new())
            }
        };

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(?outcome, elapsed_ms, "sample finished");
        Ok(ExecutionReport {
            outcome,
            stdout,
            stderr,
            elapsed_ms,
        })
    }
}

/// Keep the first `cap` characters of a stream and discard the rest, so a
/// chatty child never blocks on a full pipe.
async fn read_capped<R>(reader: Option<R>, cap: usize) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(String::new());
    };
    let byte_cap = u64::try_from(cap.saturating_mul(4)).unwrap_or(u64::MAX);
    let mut head = Vec::new();
    (&mut reader).take(byte_cap).read_to_end(&mut head).await?;
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(String::from_utf8_lossy(&head).chars().take(cap).collect())
}

/// Write `code` to a private temporary directory and run it.
///
/// The directory is owned by this call and deleted when it returns, whether
/// the run succeeds, fails, times out or errors.
pub async fn run_sample(
    runner: &dyn ScriptRunner,
    code: &str,
    config: &SandboxConfig,
) -> SandboxResult<ExecutionReport> {
    let workdir = tempfile::Builder::new()
        .prefix("trustgate-sample-")
        .tempdir()?;
    let script = workdir.path().join(SCRIPT_NAME);
    tokio::fs::write(&script, code).await?;
    runner
        .run_file(&script, config.timeout(), config.output_cap)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records the script path and whether it existed during the run.
    struct PathProbe {
        seen: Arc<Mutex<Option<std::path::PathBuf>>>,
    }

    #[async_trait]
    impl ScriptRunner for PathProbe {
        async fn run_file(
            &self,
            script: &Path,
            _timeout: Duration,
            _output_cap: usize,
        ) -> SandboxResult<ExecutionReport> {
            assert!(script.exists());
            *self.seen.lock().unwrap() = Some(script.to_path_buf());
            Err(SandboxError::InvalidConfig("probe".into()))
        }
    }

    #[tokio::test]
    async fn test_script_removed_even_on_error() {
        let seen = Arc::new(Mutex::new(None));
        let probe = PathProbe { seen: seen.clone() };
        let result = run_sample(&probe, "print(1)", &SandboxConfig::default()).await;
        assert!(result.is_err());

        let path = seen.lock().unwrap().clone().unwrap();
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_read_capped_truncates_and_drains() {
        let data = "x".repeat(5000);
        let out = read_capped(Some(data.as_bytes()), 10).await.unwrap();
        assert_eq!(out, "x".repeat(10));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_error() {
        let runner = SubprocessRunner::new("trustgate-no-such-interpreter");
        let err = run_sample(&runner, "print(1)", &SandboxConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_runner_succeeds_and_fails() {
        let runner = SubprocessRunner::new("sh");
        let config = SandboxConfig::default();

        let ok = run_sample(&runner, "echo hello", &config).await.unwrap();
        assert!(ok.succeeded());
        assert_eq!(ok.stdout.trim(), "hello");

        let bad = run_sample(&runner, "exit 3", &config).await.unwrap();
        assert_eq!(bad.outcome, ExecutionOutcome::Failed { exit_code: Some(3) });
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_runner_times_out() {
        let runner = SubprocessRunner::new("sh");
        let config = SandboxConfig {
            timeout_secs: 1,
            ..SandboxConfig::default()
        };
        let started = Instant::now();
        let report = run_sample(&runner, "while true; do :; done", &config)
            .await
            .unwrap();
        assert_eq!(report.outcome, ExecutionOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}

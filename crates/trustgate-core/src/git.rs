//! Git CLI wrapper for repository mining.
//!
//! Every invocation runs as a `tokio::process` child with its own deadline
//! and `kill_on_drop`, so a hung remote never stalls the evaluation. Clones
//! live in a [`tempfile::TempDir`] owned by [`EphemeralClone`] and disappear
//! when it is dropped, including after a failed or timed-out clone.

use std::collections::HashSet;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use crate::config::GitConfig;
use crate::domain::error::{Result, TrustgateError};

/// Record separator emitted before each commit header in [`GitCli::log_numstat`].
pub const COMMIT_SEPARATOR: char = '\u{1e}';
/// Field separator between hash and subject in a commit header.
pub const FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone)]
pub struct GitCli {
    executable: String,
    clone_timeout: Duration,
    log_timeout: Duration,
}

/// A clone that is deleted when dropped.
#[derive(Debug)]
pub struct EphemeralClone {
    dir: TempDir,
}

impl EphemeralClone {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl GitCli {
    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            clone_timeout: config.clone_timeout(),
            log_timeout: config.log_timeout(),
        }
    }

    /// Clone `url` into a fresh temporary directory. `depth` requests a
    /// shallow clone.
    pub async fn clone_ephemeral(&self, url: &str, depth: Option<u32>) -> Result<EphemeralClone> {
        let dir = tempfile::Builder::new()
            .prefix("trustgate-clone-")
            .tempdir()?;
        let target = dir.path().to_string_lossy().into_owned();

        let depth_arg = depth.map(|d| format!("--depth={d}"));
        let mut args = vec!["clone", "--quiet", "--no-tags"];
        if let Some(d) = depth_arg.as_deref() {
            args.push(d);
        }
        args.extend(["--", url, target.as_str()]);

        debug!(url = %url, ?depth, "cloning repository");
        self.run(None, &args, self.clone_timeout).await?;
        Ok(EphemeralClone { dir })
    }

    /// Full history with per-file added/removed counts.
    ///
    /// Each commit starts with `\x1e<hash>\x1f<subject>` followed by
    /// `added\tremoved\tpath` lines. Merge commits print a header only.
    pub async fn log_numstat(&self, repo: &Path) -> Result<String> {
        let out = self
            .run(
                Some(repo),
                &[
                    "log",
                    "--all",
                    "--numstat",
                    "--no-renames",
                    "--pretty=format:%x1e%H%x1f%s",
                ],
                self.log_timeout,
            )
            .await?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Number of distinct author emails in the reachable history.
    pub async fn author_count(&self, repo: &Path) -> Result<usize> {
        let out = self
            .run(Some(repo), &["log", "--all", "--format=%ae"], self.log_timeout)
            .await?;
        let authors: HashSet<String> = String::from_utf8_lossy(&out)
            .lines()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(authors.len())
    }

    async fn run(&self, dir: Option<&Path>, args: &[&str], timeout: Duration) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.executable);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_ASKPASS", "")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| TrustgateError::GitError(format!("failed to run git: {e}")))?;
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                TrustgateError::GitError(format!(
                    "git {} timed out after {}s",
                    args.first().copied().unwrap_or_default(),
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| TrustgateError::GitError(format!("failed to wait for git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrustgateError::GitError(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init", "--quiet"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        std::fs::write(dir.path().join("main.py"), "print(1)\nprint(2)\n").unwrap();
        run_git(dir.path(), &["add", "."]);
        run_git(dir.path(), &["commit", "--quiet", "-m", "initial (#1)"]);
        dir
    }

    #[tokio::test]
    async fn test_clone_and_log_local_repo() {
        let origin = make_git_repo();
        let git = GitCli::from_config(&GitConfig::default());

        let clone = git
            .clone_ephemeral(&origin.path().to_string_lossy(), None)
            .await
            .unwrap();
        assert!(clone.path().join("main.py").exists());

        let log = git.log_numstat(clone.path()).await.unwrap();
        assert!(log.contains("initial (#1)"));
        assert!(log.contains("2\t0\tmain.py"));
        assert_eq!(git.author_count(clone.path()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clone_dir_removed_on_drop() {
        let origin = make_git_repo();
        let git = GitCli::from_config(&GitConfig::default());
        let clone = git
            .clone_ephemeral(&origin.path().to_string_lossy(), None)
            .await
            .unwrap();
        let path = clone.path().to_path_buf();
        drop(clone);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_clone_failure_is_git_error() {
        let missing = tempfile::tempdir().unwrap();
        let git = GitCli::from_config(&GitConfig::default());
        let err = git
            .clone_ephemeral(&missing.path().join("nope").to_string_lossy(), Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TrustgateError::GitError(_)));
    }

    #[tokio::test]
    async fn test_missing_git_binary_is_git_error() {
        let git = GitCli::from_config(&GitConfig {
            executable: "trustgate-no-such-git".into(),
            ..GitConfig::default()
        });
        let dir = tempfile::tempdir().unwrap();
        let err = git.log_numstat(dir.path()).await.unwrap_err();
        assert!(matches!(err, TrustgateError::GitError(_)));
    }
}

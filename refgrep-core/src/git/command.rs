//! Invocation of the external `git` binary

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::config::GitConfig;
use crate::{Error, Result};

/// Handle on the `git` executable used for clone, refresh and search
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Path to the git executable (defaults to "git" in PATH)
    binary: String,
    /// Optional upper bound for each invocation
    timeout: Option<Duration>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::from_config(&GitConfig::default())
    }
}

impl GitCli {
    /// Create a handle from git configuration
    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: config.timeout,
        }
    }

    /// Set a custom path to the git executable
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// The executable this handle runs
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// The per-invocation timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Check if the git executable can be run
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Build a git command with stdin closed, optionally inside `cwd`
    ///
    /// The child is killed if its handle is dropped before it exits.
    pub(crate) fn command<I, S>(&self, args: I, cwd: Option<&Path>) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run a git command to completion and capture its output
    ///
    /// A non-zero exit status is not an error here; callers inspect it.
    pub(crate) async fn output<I, S>(&self, args: I, cwd: Option<&Path>) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(args, cwd);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let subcommand = subcommand_name(cmd.as_std());
        tracing::debug!(git = %self.binary, command = %subcommand, cwd = ?cwd, "Running git");

        let pending = cmd.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| Error::Timeout {
                    command: subcommand,
                    elapsed: limit,
                })?,
            None => pending.await,
        };

        output.map_err(|e| Error::Other(format!("Failed to run {}: {}", self.binary, e)))
    }
}

/// First argument of a git command, for logs and timeout errors
pub(crate) fn subcommand_name(cmd: &std::process::Command) -> String {
    cmd.get_args()
        .next()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = GitConfig {
            binary: "/usr/bin/git".to_string(),
            timeout: Some(Duration::from_secs(5)),
        };
        let git = GitCli::from_config(&config);
        assert_eq!(git.binary(), "/usr/bin/git");
        assert_eq!(git.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let git = GitCli::default().with_binary("/nonexistent/bin/git-refgrep");
        assert!(!git.is_available());
    }

    #[tokio::test]
    async fn test_output_missing_binary() {
        let git = GitCli::default().with_binary("/nonexistent/bin/git-refgrep");
        let result = git.output(["--version"], None).await;
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[tokio::test]
    async fn test_output_version() {
        let git = GitCli::default();
        if !git.is_available() {
            return;
        }
        let output = git.output(["--version"], None).await.unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).starts_with("git version"));
    }
}

//! Mirror clones and their scratch directories

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::command::GitCli;
use crate::{Error, Result};

/// Longest directory name derived from a repository URL
pub const MAX_DIR_NAME_LEN: usize = 200;

/// Derive a filesystem-safe directory name from a repository URL
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_`, and the result is
/// cut to [`MAX_DIR_NAME_LEN`] characters.
pub fn mirror_dir_name(repo_url: &str) -> String {
    repo_url
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_DIR_NAME_LEN)
        .collect()
}

/// Process-lifetime temporary root holding one scratch directory per repository
#[derive(Debug)]
pub struct MirrorWorkspace {
    root: TempDir,
}

impl MirrorWorkspace {
    /// Create the temporary root, under `parent` or the system temp dir
    pub fn new(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("refgrep-");

        let root = match parent {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)?
            }
            None => builder.tempdir()?,
        };

        tracing::debug!(root = %root.path().display(), "Created scan workspace");
        Ok(Self { root })
    }

    /// Path of the temporary root
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Reserve a fresh directory for one repository's mirror
    ///
    /// The directory and everything cloned into it are removed when the
    /// returned [`MirrorDir`] is dropped.
    pub fn allocate(&self, repo_url: &str) -> Result<MirrorDir> {
        let scratch = tempfile::Builder::new()
            .prefix("repo-")
            .tempdir_in(self.root.path())?;
        let path = scratch.path().join(mirror_dir_name(repo_url));
        Ok(MirrorDir { scratch, path })
    }
}

/// Scratch location for a single mirror clone
#[derive(Debug)]
pub struct MirrorDir {
    scratch: TempDir,
    path: PathBuf,
}

impl MirrorDir {
    /// Where the mirror is (or will be) cloned
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now, reporting failures
    pub fn close(self) -> Result<()> {
        self.scratch.close().map_err(Error::Io)
    }
}

/// Why a mirror clone failed, as far as git's stderr tells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneFailure {
    /// Credentials rejected or missing
    Authentication,
    /// Host unreachable or transport error
    Network,
    /// Repository does not exist
    NotFound,
    /// Anything else
    Other,
}

impl CloneFailure {
    /// Classify a failed clone from git's stderr
    pub fn classify(stderr: &str) -> Self {
        if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("could not read Username")
        {
            return Self::Authentication;
        }

        if stderr.contains("Could not resolve host") || stderr.contains("unable to access") {
            return Self::Network;
        }

        if stderr.contains("not found")
            || stderr.contains("does not exist")
            || stderr.contains("does not appear to be a git repository")
        {
            return Self::NotFound;
        }

        Self::Other
    }

    /// Short human-readable label
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication failed",
            Self::Network => "network error",
            Self::NotFound => "repository not found",
            Self::Other => "git clone failed",
        }
    }
}

impl GitCli {
    /// Mirror-clone `repo_url` into `dest` (all refs, no working tree)
    pub async fn mirror_clone(&self, repo_url: &str, dest: &Path) -> Result<()> {
        let args = [
            OsStr::new("clone"),
            OsStr::new("--mirror"),
            OsStr::new("--quiet"),
            OsStr::new("--"),
            OsStr::new(repo_url),
            dest.as_os_str(),
        ];
        let output = self.output(args, None).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let failure = CloneFailure::classify(&stderr);
            tracing::debug!(repo = %repo_url, ?failure, stderr = %stderr.trim(), "git clone --mirror failed");
            return Err(Error::Clone(format!(
                "{} for {}: {}",
                failure.describe(),
                repo_url,
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Refresh every ref of a mirror from its remote, pruning deleted ones
    pub async fn refresh_references(&self, mirror: &Path) -> Result<()> {
        let output = self
            .output(["remote", "update", "--prune"], Some(mirror))
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Other(format!(
                "git remote update failed for {}: {}",
                mirror.display(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

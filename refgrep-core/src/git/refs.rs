//! Branch enumeration inside a mirror clone

use std::path::{Path, PathBuf};

use git2::{BranchType, Repository};

use crate::{Error, Result};

/// A mirror clone opened through libgit2
pub struct MirrorRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the mirror (a bare repository)
    path: PathBuf,
}

impl std::fmt::Debug for MirrorRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorRepo")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl MirrorRepo {
    /// Open the repository at exactly `path` (no upward discovery)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Git(e)
            }
        })?;

        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    /// Every branch-like reference, as short names
    ///
    /// Local branches (`refs/heads`) come first, then remote-tracking
    /// branches (`refs/remotes`), each group sorted by name.
    pub fn list_references(&self) -> Result<Vec<String>> {
        let mut refs = self.list_local_branches()?;
        refs.extend(self.list_remote_branches()?);
        Ok(refs)
    }

    /// List all local branches, sorted
    pub fn list_local_branches(&self) -> Result<Vec<String>> {
        self.branch_names(BranchType::Local)
    }

    /// List all remote tracking branches, sorted
    pub fn list_remote_branches(&self) -> Result<Vec<String>> {
        self.branch_names(BranchType::Remote)
    }

    fn branch_names(&self, kind: BranchType) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for branch in self.repo.branches(Some(kind))? {
            let (branch, _) = branch?;
            match branch.name() {
                Ok(Some(name)) => names.push(name.to_string()),
                // Not valid UTF-8; git grep could not be handed the name anyway
                _ => tracing::warn!(path = %self.path.display(), "Skipping branch with non UTF-8 name"),
            }
        }

        names.sort();
        Ok(names)
    }
}

//! Scan orchestration
//!
//! For each repository: mirror-clone, refresh refs, enumerate branches, then
//! run one `git grep` per (reference, pattern) pair and stream every hit to
//! a [`MatchSink`]. Repositories are processed strictly one after another.
//! A repository that cannot be cloned or scanned is reported and skipped;
//! only a failing sink stops the batch.

use crate::config::Config;
use crate::git::{GitCli, MirrorRepo, MirrorWorkspace};
use crate::record::MatchRecord;
use crate::sink::MatchSink;
use crate::{Error, Result};

/// How the scan of one repository ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// The mirror clone failed; the message says why
    CloneFailed(String),
    /// The mirror had no branches to search
    NoReferences,
    /// Every search came back empty
    NoMatches,
    /// At least one record was written
    Matched {
        /// Number of records written for this repository
        rows: usize,
    },
    /// Something else went wrong after cloning
    Failed(String),
}

/// Progress notifications emitted while scanning
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent<'a> {
    /// Processing of a repository begins
    RepoStarted {
        /// Repository URL
        repo: &'a str,
    },
    /// The first match of a repository is about to be written
    FirstMatch {
        /// Repository URL
        repo: &'a str,
    },
    /// Processing of a repository ended
    RepoFinished {
        /// Repository URL
        repo: &'a str,
        /// What happened
        outcome: &'a RepoOutcome,
    },
}

/// Receives [`ScanEvent`]s, e.g. to narrate progress to the user
pub trait ScanObserver {
    /// Handle one event
    fn on_event(&mut self, event: ScanEvent<'_>);
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct SilentObserver;

impl ScanObserver for SilentObserver {
    fn on_event(&mut self, _event: ScanEvent<'_>) {}
}

/// Totals over a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Repositories processed
    pub repositories: usize,
    /// Repositories that failed to clone or scan
    pub failed: usize,
    /// Repositories with at least one match
    pub matched: usize,
    /// Records written in total
    pub rows: usize,
}

impl ScanSummary {
    fn record(&mut self, outcome: &RepoOutcome) {
        self.repositories += 1;
        match outcome {
            RepoOutcome::CloneFailed(_) | RepoOutcome::Failed(_) => self.failed += 1,
            RepoOutcome::Matched { rows } => {
                self.matched += 1;
                self.rows += rows;
            }
            RepoOutcome::NoReferences | RepoOutcome::NoMatches => {}
        }
    }
}

/// Drives clone, enumerate and search for a list of repositories
#[derive(Debug)]
pub struct Scanner {
    git: GitCli,
    workspace: MirrorWorkspace,
}

impl Scanner {
    /// Create a scanner from its parts
    pub fn new(git: GitCli, workspace: MirrorWorkspace) -> Self {
        Self { git, workspace }
    }

    /// Create a scanner from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let git = GitCli::from_config(&config.git);
        let workspace = MirrorWorkspace::new(config.scan.temp_dir.as_deref())?;
        Ok(Self::new(git, workspace))
    }

    /// Scan every repository for every pattern
    ///
    /// Per-repository failures are reported through the observer and do not
    /// stop the batch. Only a sink error is returned.
    pub async fn scan_all(
        &self,
        repos: &[String],
        patterns: &[String],
        sink: &mut dyn MatchSink,
        observer: &mut dyn ScanObserver,
    ) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();

        for repo in repos {
            let repo = repo.as_str();
            observer.on_event(ScanEvent::RepoStarted { repo });

            let outcome = match self.scan_repository(repo, patterns, sink, observer).await {
                Ok(outcome) => outcome,
                Err(e @ Error::Output(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(repo = %repo, error = %e, "Repository scan failed");
                    RepoOutcome::Failed(e.to_string())
                }
            };

            summary.record(&outcome);
            observer.on_event(ScanEvent::RepoFinished {
                repo,
                outcome: &outcome,
            });
        }

        sink.flush()?;
        tracing::info!(
            repositories = summary.repositories,
            failed = summary.failed,
            matched = summary.matched,
            rows = summary.rows,
            "Scan complete"
        );
        Ok(summary)
    }

    /// Clone one repository, search it, and release its mirror
    pub async fn scan_repository(
        &self,
        repo: &str,
        patterns: &[String],
        sink: &mut dyn MatchSink,
        observer: &mut dyn ScanObserver,
    ) -> Result<RepoOutcome> {
        let mirror = self.workspace.allocate(repo)?;

        if let Err(e) = self.git.mirror_clone(repo, mirror.path()).await {
            tracing::warn!(repo = %repo, error = %e, "Mirror clone failed");
            return Ok(RepoOutcome::CloneFailed(e.to_string()));
        }

        if let Err(e) = self.git.refresh_references(mirror.path()).await {
            tracing::debug!(repo = %repo, error = %e, "Ref refresh failed; using refs from clone");
        }

        let references = MirrorRepo::open(mirror.path())?.list_references()?;
        if references.is_empty() {
            return Ok(RepoOutcome::NoReferences);
        }
        tracing::debug!(repo = %repo, references = references.len(), "Enumerated references");

        let mut rows = 0;
        for reference in &references {
            for pattern in patterns {
                let mut stream = match self
                    .git
                    .search_content(mirror.path(), reference, pattern)
                    .await
                {
                    Ok(stream) => stream,
                    Err(e) => {
                        tracing::warn!(repo = %repo, reference = %reference, pattern = %pattern, error = %e, "Search could not start");
                        continue;
                    }
                };

                while let Some(hit) = stream.next_match().await? {
                    if rows == 0 {
                        observer.on_event(ScanEvent::FirstMatch { repo });
                    }
                    sink.write_record(&MatchRecord::from_match(repo, reference, pattern, hit))?;
                    rows += 1;
                }

                if let Err(e) = stream.finish().await {
                    tracing::warn!(repo = %repo, reference = %reference, pattern = %pattern, error = %e, "Search failed");
                }
            }
        }

        if let Err(e) = mirror.close() {
            tracing::warn!(repo = %repo, error = %e, "Failed to remove mirror directory");
        }

        Ok(if rows == 0 {
            RepoOutcome::NoMatches
        } else {
            RepoOutcome::Matched { rows }
        })
    }
}

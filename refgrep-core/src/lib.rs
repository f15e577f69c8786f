//! refgrep Core - mirror-clone git repositories and search every branch
//!
//! This crate provides list parsing, the git operations (mirror clone, ref
//! refresh, branch enumeration, `git grep`), the output sinks and the scan
//! loop that ties them together.

pub mod config;
pub mod error;
pub mod git;
pub mod list;
pub mod record;
pub mod scan;
pub mod sink;

pub use config::{CliOverrides, Config, DEFAULT_CONSOLE_PATTERN};
pub use error::{Error, Result};
pub use git::{GitCli, MirrorRepo, MirrorWorkspace};
pub use list::{parse_entries, read_entry_list};
pub use record::MatchRecord;
pub use scan::{RepoOutcome, ScanEvent, ScanObserver, ScanSummary, Scanner, SilentObserver};
pub use sink::{ConsoleSink, CsvSink, MatchSink};

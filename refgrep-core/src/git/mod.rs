//! Git operations for refgrep
//!
//! Cloning, ref refreshing and content search shell out to the `git`
//! binary; branch enumeration goes through libgit2.

mod command;
mod grep;
mod mirror;
mod refs;

pub use command::GitCli;
pub use grep::{parse_grep_line, GrepMatch, SearchStream};
pub use mirror::{mirror_dir_name, CloneFailure, MirrorDir, MirrorWorkspace, MAX_DIR_NAME_LEN};
pub use refs::MirrorRepo;

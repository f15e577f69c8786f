//! Error types for refgrep

use std::time::Duration;

use thiserror::Error;

/// Result type alias for refgrep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for refgrep operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// libgit2 error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mirror clone failed
    #[error("Clone failed: {0}")]
    Clone(String),

    /// Content search failed
    #[error("Search failed: {0}")]
    Search(String),

    /// Writing to the match sink failed
    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// A git command did not finish within the configured timeout
    #[error("`git {command}` timed out after {elapsed:?}")]
    Timeout {
        /// The git subcommand that was running
        command: String,
        /// The configured limit
        elapsed: Duration,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

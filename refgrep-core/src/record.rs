//! Match records produced by a scan

use crate::git::GrepMatch;

/// One line, in one file, under one reference, matching one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Repository URL exactly as listed
    pub repo_url: String,
    /// Short reference name (e.g. `main`, `origin/dev`)
    pub reference: String,
    /// File path inside the reference's tree
    pub file_path: String,
    /// 1-based line number
    pub line_number: u64,
    /// The matching line
    pub matched_line: String,
    /// Pattern that produced the match
    pub pattern: String,
}

impl MatchRecord {
    /// Build a record from a grep hit
    pub fn from_match(repo_url: &str, reference: &str, pattern: &str, hit: GrepMatch) -> Self {
        Self {
            repo_url: repo_url.to_string(),
            reference: reference.to_string(),
            file_path: hit.path,
            line_number: hit.line_number,
            matched_line: hit.content,
            pattern: pattern.to_string(),
        }
    }
}

//! Newline-delimited entry lists (repositories, patterns)
//!
//! One entry per line. Blank lines and lines whose first non-whitespace
//! character is `#` are skipped; everything else is trimmed and kept verbatim.

use std::path::Path;

use crate::{Error, Result};

/// Extract entries from list file contents
pub fn parse_entries(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read and parse a list file
///
/// The path must name a regular file.
pub fn read_entry_list(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(Error::Config(format!(
            "List file does not exist or is not a regular file: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    let entries = parse_entries(&contents);
    tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded entry list");
    Ok(entries)
}

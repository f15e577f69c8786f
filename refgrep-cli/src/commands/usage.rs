//! Usage help printed when an input list is missing

use std::path::Path;

/// Which input list was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Repository URLs
    Repositories,
    /// Search patterns
    Patterns,
}

impl ListKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Repositories => "Repository list",
            Self::Patterns => "Pattern list",
        }
    }

    fn example(&self) -> &'static str {
        match self {
            Self::Repositories => "\
  # one git URL (or local path) per line
  https://github.com/owner/repo.git
  git@github.com:owner/other.git
  /srv/git/internal.git",
            Self::Patterns => "\
  # one pattern per line, git grep syntax
  password
  api[_-]key
  BEGIN RSA PRIVATE KEY",
        }
    }
}

/// Full message for a missing list file
pub fn missing_list_message(kind: ListKind, path: &Path, usage: &str) -> String {
    format!(
        "{} file not found: {}\n\nUsage: {}\n\nExample {}:\n{}",
        kind.label(),
        path.display(),
        usage,
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        kind.example()
    )
}

/// Print the missing-list message to stderr
pub fn report_missing_list(kind: ListKind, path: &Path, usage: &str) {
    eprintln!("{}", missing_list_message(kind, path, usage));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_file_and_example() {
        let msg = missing_list_message(
            ListKind::Patterns,
            Path::new("conf/patterns.txt"),
            "refgrep csv [REPOS] [PATTERNS] [OUTPUT]",
        );
        assert!(msg.starts_with("Pattern list file not found: conf/patterns.txt"));
        assert!(msg.contains("Usage: refgrep csv"));
        assert!(msg.contains("Example patterns.txt:"));
        assert!(msg.contains("api[_-]key"));
    }

    #[test]
    fn test_repo_example() {
        let msg = missing_list_message(ListKind::Repositories, Path::new("repos.txt"), "x");
        assert!(msg.contains("https://github.com/owner/repo.git"));
    }
}

//! Console command - search for the configured pattern and print matches

use std::path::PathBuf;

use clap::Args;
use refgrep_core::{read_entry_list, Config, ConsoleSink, Scanner};

use super::narrate::{Narrator, Variant};
use super::usage::{report_missing_list, ListKind};
use super::{EXIT_OK, EXIT_USAGE};

const USAGE: &str = "refgrep console [REPOS]";

/// Arguments for the console command
#[derive(Args, Debug)]
pub struct ConsoleArgs {
    /// File listing repository URLs, one per line
    #[arg(default_value = "repos.txt")]
    pub repos: PathBuf,
}

impl ConsoleArgs {
    /// Execute the console command, returning the process exit status
    ///
    /// The pattern comes from configuration (`[console] pattern` or
    /// `REFGREP_PATTERN`), never from the command line.
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<u8> {
        if !self.repos.is_file() {
            report_missing_list(ListKind::Repositories, &self.repos, USAGE);
            return Ok(EXIT_USAGE);
        }

        let repos = read_entry_list(&self.repos)?;
        if repos.is_empty() {
            println!(
                "No repositories in {} (only comments/blank lines).",
                self.repos.display()
            );
            return Ok(EXIT_OK);
        }

        let pattern = config.console.pattern.trim();
        if pattern.is_empty() {
            println!("No pattern configured. Nothing to do.");
            return Ok(EXIT_OK);
        }

        if verbose {
            tracing::info!(repos = repos.len(), pattern = %pattern, "Starting console scan");
        }

        let scanner = Scanner::from_config(config)?;
        let mut sink = ConsoleSink::stdout();
        let mut narrator = Narrator::new(Variant::Console);
        scanner
            .scan_all(&repos, &[pattern.to_string()], &mut sink, &mut narrator)
            .await?;

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_repo_list_is_usage_error() {
        let temp = TempDir::new().unwrap();
        let args = ConsoleArgs {
            repos: temp.path().join("repos.txt"),
        };

        let code = args.execute(false, &Config::default()).await.unwrap();
        assert_eq!(code, EXIT_USAGE);
    }

    #[tokio::test]
    async fn test_empty_repo_list_exits_ok() {
        let temp = TempDir::new().unwrap();
        let args = ConsoleArgs {
            repos: temp.path().join("repos.txt"),
        };
        std::fs::write(&args.repos, "# nothing here\n\n").unwrap();

        let code = args.execute(false, &Config::default()).await.unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_blank_pattern_exits_ok() {
        let temp = TempDir::new().unwrap();
        let args = ConsoleArgs {
            repos: temp.path().join("repos.txt"),
        };
        std::fs::write(&args.repos, "/nonexistent/refgrep/repo.git\n").unwrap();

        let mut config = Config::default();
        config.console.pattern = "   ".to_string();

        let code = args.execute(false, &config).await.unwrap();
        assert_eq!(code, EXIT_OK);
    }
}

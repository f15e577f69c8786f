//! CSV command - search with a pattern list and write matches to a CSV file

use std::path::PathBuf;

use clap::Args;
use refgrep_core::{read_entry_list, Config, CsvSink, Scanner};

use super::narrate::{Narrator, Variant};
use super::usage::{report_missing_list, ListKind};
use super::{EXIT_OK, EXIT_USAGE};

const USAGE: &str = "refgrep csv [REPOS] [PATTERNS] [OUTPUT]";

/// Arguments for the csv command
#[derive(Args, Debug)]
pub struct CsvArgs {
    /// File listing repository URLs, one per line
    #[arg(default_value = "repos.txt")]
    pub repos: PathBuf,

    /// File listing search patterns, one per line
    #[arg(default_value = "patterns.txt")]
    pub patterns: PathBuf,

    /// CSV file to write matches to (overwritten)
    #[arg(default_value = "results.csv")]
    pub output: PathBuf,
}

impl CsvArgs {
    /// Execute the csv command, returning the process exit status
    pub async fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<u8> {
        if !self.repos.is_file() {
            report_missing_list(ListKind::Repositories, &self.repos, USAGE);
            return Ok(EXIT_USAGE);
        }
        if !self.patterns.is_file() {
            report_missing_list(ListKind::Patterns, &self.patterns, USAGE);
            return Ok(EXIT_USAGE);
        }

        let mut sink = CsvSink::create(&self.output)?;

        let patterns = read_entry_list(&self.patterns)?;
        if patterns.is_empty() {
            println!(
                "No patterns in {} (only comments/blank lines). Nothing to do.",
                self.patterns.display()
            );
            return Ok(EXIT_OK);
        }

        let repos = read_entry_list(&self.repos)?;
        if repos.is_empty() {
            println!(
                "No repositories in {} (only comments/blank lines). Nothing to do.",
                self.repos.display()
            );
            return Ok(EXIT_OK);
        }

        if verbose {
            tracing::info!(
                repos = repos.len(),
                patterns = patterns.len(),
                output = %self.output.display(),
                "Starting CSV scan"
            );
        }

        let scanner = Scanner::from_config(config)?;
        let mut narrator = Narrator::new(Variant::Csv);
        let summary = scanner
            .scan_all(&repos, &patterns, &mut sink, &mut narrator)
            .await?;

        println!(
            "Done. Results in {} ({} rows; {} of {} repositories matched, {} failed)",
            self.output.display(),
            summary.rows,
            summary.matched,
            summary.repositories,
            summary.failed
        );

        Ok(EXIT_OK)
    }
}

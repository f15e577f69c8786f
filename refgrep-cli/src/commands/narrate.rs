//! Progress narration for the user

use refgrep_core::{RepoOutcome, ScanEvent, ScanObserver};

/// Which command is narrating; the CSV variant reports more per repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `refgrep csv`
    Csv,
    /// `refgrep console`
    Console,
}

/// Where a narration line goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Prints one line per notable scan event
#[derive(Debug)]
pub struct Narrator {
    variant: Variant,
}

impl Narrator {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    /// The line (if any) to print for an event
    pub fn message(&self, event: ScanEvent<'_>) -> Option<(Stream, String)> {
        match event {
            ScanEvent::RepoStarted { repo } => Some((Stream::Stdout, format!("--- Repo: {}", repo))),
            ScanEvent::FirstMatch { repo } => match self.variant {
                Variant::Console => Some((Stream::Stdout, format!("Found in repo: {}", repo))),
                Variant::Csv => None,
            },
            ScanEvent::RepoFinished { repo, outcome } => match (outcome, self.variant) {
                (RepoOutcome::CloneFailed(reason), _) => Some((
                    Stream::Stderr,
                    format!("ERROR: could not clone repo {}: {}", repo, reason),
                )),
                (RepoOutcome::Failed(reason), _) => Some((
                    Stream::Stderr,
                    format!("ERROR while processing {}: {}", repo, reason),
                )),
                (RepoOutcome::NoReferences, _) => Some((
                    Stream::Stdout,
                    format!("No references to search in repo: {}", repo),
                )),
                (RepoOutcome::NoMatches, Variant::Csv) => {
                    Some((Stream::Stdout, format!("No occurrences found in {}", repo)))
                }
                (RepoOutcome::Matched { rows }, Variant::Csv) => Some((
                    Stream::Stdout,
                    format!("Results written for {} ({} rows)", repo, rows),
                )),
                (RepoOutcome::NoMatches | RepoOutcome::Matched { .. }, Variant::Console) => None,
            },
        }
    }
}

impl ScanObserver for Narrator {
    fn on_event(&mut self, event: ScanEvent<'_>) {
        match self.message(event) {
            Some((Stream::Stdout, line)) => println!("{}", line),
            Some((Stream::Stderr, line)) => eprintln!("{}", line),
            None => {}
        }
    }
}

//! refgrep CLI - Command line interface for refgrep
//!
//! Mirror-clones every repository in a list and greps every branch of it.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use refgrep_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ConsoleArgs, CsvArgs};

/// refgrep: search every branch of many git repositories
#[derive(Parser, Debug)]
#[command(name = "refgrep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/refgrep/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to git executable (overrides config and env)
    #[arg(long, global = true, env = "REFGREP_GIT_PATH")]
    git_path: Option<String>,

    /// Give up on a single git command after this long (e.g. "90s", "10m")
    #[arg(long, global = true, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Directory to create temporary mirrors under
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search with a pattern list and write matches to a CSV file
    Csv(CsvArgs),

    /// Search for the configured pattern and print matches
    Console(ConsoleArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

fn parse_timeout(input: &str) -> Result<Duration, String> {
    refgrep_core::config::parse_duration(input).map_err(|e| e.to_string())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let overrides = CliOverrides {
        git_path: cli.git_path.clone(),
        timeout: cli.timeout,
        temp_dir: cli.temp_dir.clone(),
    };
    let config = Config::load_with_overrides(cli.config.as_deref(), overrides)?;

    if cli.verbose {
        tracing::info!(
            git = %config.git.binary,
            timeout = ?config.git.timeout,
            temp_dir = ?config.scan.temp_dir,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Csv(args)) => args.execute(cli.verbose, &config).await,
        Some(Commands::Console(args)) => args.execute(cli.verbose, &config).await,
        Some(Commands::Config) => {
            print_config(&config, cli.config.as_deref());
            Ok(commands::EXIT_OK)
        }
        Some(Commands::Version) => {
            println!("refgrep {}", env!("CARGO_PKG_VERSION"));
            Ok(commands::EXIT_OK)
        }
        None => {
            println!("refgrep - search every branch of many git repositories");
            println!();
            println!("Use --help for usage information");
            Ok(commands::EXIT_OK)
        }
    }
}

fn print_config(config: &Config, explicit: Option<&std::path::Path>) {
    println!("refgrep Configuration");
    println!("=====================");
    println!();
    println!("Git Settings:");
    println!("  binary: {}", config.git.binary);
    match config.git.timeout {
        Some(t) => println!("  timeout: {:?}", t),
        None => println!("  timeout: (none)"),
    }
    println!();
    println!("Scan Settings:");
    match &config.scan.temp_dir {
        Some(dir) => println!("  temp_dir: {}", dir.display()),
        None => println!("  temp_dir: (system default)"),
    }
    println!();
    println!("Console Settings:");
    println!("  pattern: {}", config.console.pattern);
    println!();

    let path = explicit
        .map(|p| p.to_path_buf())
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_defaults() {
        let cli = Cli::try_parse_from(["refgrep", "csv"]).unwrap();
        match cli.command {
            Some(Commands::Csv(args)) => {
                assert_eq!(args.repos, PathBuf::from("repos.txt"));
                assert_eq!(args.patterns, PathBuf::from("patterns.txt"));
                assert_eq!(args.output, PathBuf::from("results.csv"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_csv_positional_args() {
        let cli =
            Cli::try_parse_from(["refgrep", "csv", "r.txt", "p.txt", "out.csv"]).unwrap();
        match cli.command {
            Some(Commands::Csv(args)) => {
                assert_eq!(args.repos, PathBuf::from("r.txt"));
                assert_eq!(args.patterns, PathBuf::from("p.txt"));
                assert_eq!(args.output, PathBuf::from("out.csv"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_console_default_repo_list() {
        let cli = Cli::try_parse_from(["refgrep", "console"]).unwrap();
        match cli.command {
            Some(Commands::Console(args)) => assert_eq!(args.repos, PathBuf::from("repos.txt")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "refgrep",
            "console",
            "list.txt",
            "--timeout",
            "2m",
            "--git-path",
            "/opt/git",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.timeout, Some(Duration::from_secs(120)));
        assert_eq!(cli.git_path.as_deref(), Some("/opt/git"));
    }

    #[test]
    fn test_bad_timeout_rejected() {
        assert!(Cli::try_parse_from(["refgrep", "csv", "--timeout", "whenever"]).is_err());
    }
}

//! Configuration management for refgrep
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REFGREP_*)
//! 3. Config file (~/.config/refgrep/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Pattern searched for by the console variant unless configured otherwise
pub const DEFAULT_CONSOLE_PATTERN: &str = "cernel1.tar.gz";

/// Git-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable
    pub binary: String,

    /// Upper bound for a single git invocation; unset means wait forever
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            timeout: None,
        }
    }
}

/// Scan-related configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Parent directory for the temporary scan root (system temp dir if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

/// Settings for the console variant
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// The fixed pattern searched for in every repository
    pub pattern: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_CONSOLE_PATTERN.to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Git configuration
    pub git: GitConfig,

    /// Scan configuration
    pub scan: ScanConfig,

    /// Console variant configuration
    pub console: ConsoleConfig,
}

/// Overrides coming from command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--git-path`
    pub git_path: Option<String>,
    /// `--timeout`
    pub timeout: Option<Duration>,
    /// `--temp-dir`
    pub temp_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/refgrep/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("refgrep").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REFGREP_GIT_PATH: Path to git executable
    /// - REFGREP_TIMEOUT: Per-command timeout (e.g. "90s", "10m")
    /// - REFGREP_PATTERN: Pattern used by the console variant
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(git_path) = std::env::var("REFGREP_GIT_PATH") {
            self.git.binary = git_path;
        }

        if let Ok(timeout) = std::env::var("REFGREP_TIMEOUT") {
            self.git.timeout = Some(parse_duration(&timeout)?);
        }

        if let Ok(pattern) = std::env::var("REFGREP_PATTERN") {
            self.console.pattern = pattern;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(path) = overrides.git_path {
            self.git.binary = path;
        }

        if let Some(timeout) = overrides.timeout {
            self.git.timeout = Some(timeout);
        }

        if let Some(dir) = overrides.temp_dir {
            self.scan.temp_dir = Some(dir);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit config path
    /// must exist; the default one is optional.
    pub fn load_with_overrides(config_path: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base.with_env_overrides()?.with_cli_overrides(overrides))
    }
}

/// Parse a human-readable duration such as `30s` or `5m`
pub fn parse_duration(input: &str) -> Result<Duration> {
    humantime_serde::re::humantime::parse_duration(input.trim())
        .map_err(|e| Error::Config(format!("Invalid duration '{}': {}", input, e)))
}

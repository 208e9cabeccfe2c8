//! # Configuration
//!
//! Settings resolve with a clear override hierarchy:
//! CLI flags → env vars → `~/.gh-traffic/config.toml` → defaults.
//!
//! If the config file is missing on first run, a commented-out default is
//! generated so users can discover the options.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAYS: u32 = 14;
pub const MAX_DAYS: u32 = 14;

/// On-disk config; every field optional for sparse TOML.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FileConfig {
    pub token: Option<String>,
    pub days: Option<u32>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Returns the path to `~/.gh-traffic/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".gh-traffic").join("config.toml"))
}

/// Load config from `~/.gh-traffic/config.toml`.
///
/// A missing file yields defaults (and generates a commented-out template);
/// a malformed one is a `ConfigError::Parse`.
pub fn load_config() -> Result<FileConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("could not determine home directory, using default config");
            return Ok(FileConfig::default());
        }
    };

    if !path.exists() {
        info!("no config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(FileConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: FileConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# gh-traffic configuration
# All settings are optional. Override hierarchy:
# CLI flags -> env vars -> this file -> defaults.

# token = "ghp_..."   # Or set GITHUB_TOKEN, or pass --token
# days = 14           # Days to display, 1..=14
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("failed to create config directory: {e}");
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("failed to write default config: {e}");
    }
}

/// Token resolution: CLI flag → `GITHUB_TOKEN` env var → config file.
pub fn resolve_token(cli_token: Option<&str>, config: &FileConfig) -> Option<String> {
    cli_token
        .map(str::to_string)
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .or_else(|| config.token.clone())
}

/// Days resolution: CLI flag → config file → default. A config value
/// outside 1..=14 is ignored with a warning (the traffic API only serves
/// 14 days).
pub fn resolve_days(cli_days: Option<u32>, config: &FileConfig) -> u32 {
    if let Some(days) = cli_days {
        return days;
    }
    match config.days {
        Some(days) if (1..=MAX_DAYS).contains(&days) => days,
        Some(days) => {
            warn!("config days = {days} out of range 1..={MAX_DAYS}, using {DEFAULT_DAYS}");
            DEFAULT_DAYS
        }
        None => DEFAULT_DAYS,
    }
}

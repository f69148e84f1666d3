//! Configuration management for the KampunG client.
//!
//! Loads configuration from ${KAMPUNG_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the API origin.
pub const API_URL_ENV: &str = "KAMPUNG_API_URL";

pub mod paths {
    //! Path resolution for configuration and session data.
    //!
    //! KAMPUNG_HOME resolution order:
    //! 1. KAMPUNG_HOME environment variable (if set)
    //! 2. ~/.config/kampung (default)

    use std::path::PathBuf;

    /// Returns the KampunG home directory.
    ///
    /// Falls back to a relative `.kampung` directory when no home directory
    /// can be determined.
    pub fn kampung_home() -> PathBuf {
        if let Ok(home) = std::env::var("KAMPUNG_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".kampung"),
            |h| h.join(".config").join("kampung"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        kampung_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        kampung_home().join("session.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API origin, e.g. `http://localhost:8080/api`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Idle time before a search query is sent, in milliseconds
    pub search_debounce_ms: u64,

    /// Optional log file; logs go to stderr when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            search_debounce_ms: Self::DEFAULT_SEARCH_DEBOUNCE_MS,
            log_file: None,
        }
    }
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default template to `path`.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolves the API origin with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the selected value is not a valid URL.
    pub fn resolve_base_url(&self) -> Result<String> {
        let from_env = std::env::var(API_URL_ENV).ok();
        resolve_base_url(from_env.as_deref(), Some(&self.base_url))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }
}

/// Picks the first non-blank candidate, env before config, else the default.
fn resolve_base_url(env_url: Option<&str>, config_url: Option<&str>) -> Result<String> {
    let chosen = [env_url, config_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(Config::DEFAULT_BASE_URL);

    url::Url::parse(chosen).with_context(|| format!("Invalid API base URL: {chosen}"))?;
    Ok(chosen.trim_end_matches('/').to_string())
}

fn default_config_template() -> &'static str {
    r#"# KampunG client configuration

# API origin (KAMPUNG_API_URL overrides this)
base_url = "http://localhost:8080/api"

# Request timeout in seconds
timeout_secs = 30

# Idle time before a search query is sent, in milliseconds
search_debounce_ms = 300

# Write logs to a file instead of stderr
# log_file = "/tmp/kampung.log"
"#
}

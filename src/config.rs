//! Configuration management
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. An optional JSON file:
//! ```json
//! {
//!   "first_account_number": 1001,
//!   "hashing": { "memory_cost_kib": 19456, "time_cost": 2, "parallelism": 1 },
//!   "log": { "filter": "info", "format": "pretty" }
//! }
//! ```
//! 3. Environment variables (`TESORO_FIRST_ACCOUNT`, `TESORO_LOG_FORMAT`)
//!
//! Command-line flags are applied on top by the console.

use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountNumber, HashingParams};
use crate::storage::DEFAULT_FIRST_ACCOUNT_NUMBER;

pub const ENV_FIRST_ACCOUNT: &str = "TESORO_FIRST_ACCOUNT";
pub const ENV_LOG_FORMAT: &str = "TESORO_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format '{}' (expected 'pretty' or 'json')", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when RUST_LOG is not set
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub first_account_number: AccountNumber,
    pub hashing: HashingParams,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_account_number: DEFAULT_FIRST_ACCOUNT_NUMBER,
            hashing: HashingParams::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load defaults, then the file at `path` (if given and present), then
    /// the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Read a JSON config file. A missing file yields the defaults; a
    /// malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(ENV_FIRST_ACCOUNT) {
            self.first_account_number = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be an account number, got '{}'", ENV_FIRST_ACCOUNT, value))?;
        }
        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.log.format = value.parse()?;
        }
        Ok(self)
    }
}

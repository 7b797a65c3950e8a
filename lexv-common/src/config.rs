//! Configuration loading for the lexv tools
//!
//! Settings resolve in this priority order:
//! 1. Command-line flag (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Flags and environment variables are handled by each binary's clap
//! definition; this module owns the TOML tier and the compiled defaults.
//! A missing TOML file is not an error: the tools log a warning and run
//! on defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LEXV_CONFIG";

/// Default remote dictionary endpoint (word is appended as one path segment)
pub const DEFAULT_BASE_URL: &str = "https://en.wiktionary.org/api/rest_v1/page/definition/";

const DEFAULT_USER_AGENT: &str = "lexv/0.1.0 (word list validator)";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Validator (single pass) settings
    #[serde(default)]
    pub validator: ValidatorSection,

    /// Convergence loop settings
    #[serde(default)]
    pub convergence: ConvergenceSection,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Where a probe that found the page but not the requested locale ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrongLocalePolicy {
    /// Route to the retry bucket
    #[default]
    Retry,
    /// Route to the hard-rejected bucket
    Reject,
}

impl FromStr for WrongLocalePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retry" => Ok(Self::Retry),
            "reject" => Ok(Self::Reject),
            other => Err(Error::InvalidInput(format!(
                "wrong-locale policy must be 'retry' or 'reject', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for WrongLocalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => write!(f, "retry"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// `[validator]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorSection {
    /// Concurrent lookups in flight
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Flush bucket streams every N records
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,

    /// Emit a progress snapshot every N completions
    #[serde(default = "default_progress_every")]
    pub progress_every: u64,

    /// Dictionary endpoint; the encoded word is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Global pacing across all workers, 0 disables
    #[serde(default)]
    pub requests_per_second: u32,

    /// Re-attempts of a single probe after HTTP 429
    #[serde(default = "default_rate_limit_max_retries")]
    pub rate_limit_max_retries: u32,

    #[serde(default = "default_rate_limit_base_delay_ms")]
    pub rate_limit_base_delay_ms: u64,

    #[serde(default = "default_rate_limit_max_delay_ms")]
    pub rate_limit_max_delay_ms: u64,

    #[serde(default)]
    pub wrong_locale: WrongLocalePolicy,
}

impl Default for ValidatorSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            flush_every: default_flush_every(),
            progress_every: default_progress_every(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            requests_per_second: 0,
            rate_limit_max_retries: default_rate_limit_max_retries(),
            rate_limit_base_delay_ms: default_rate_limit_base_delay_ms(),
            rate_limit_max_delay_ms: default_rate_limit_max_delay_ms(),
            wrong_locale: WrongLocalePolicy::default(),
        }
    }
}

/// `[convergence]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceSection {
    /// Pause between passes, relieves pressure on the remote service
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,

    /// Optional safeguard; unset means no cap
    #[serde(default)]
    pub max_passes: Option<u32>,
}

impl Default for ConvergenceSection {
    fn default() -> Self {
        Self {
            pause_secs: default_pause_secs(),
            max_passes: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_workers() -> usize {
    8
}

fn default_flush_every() -> usize {
    100
}

fn default_progress_every() -> u64 {
    100
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_rate_limit_max_retries() -> u32 {
    6
}

fn default_rate_limit_base_delay_ms() -> u64 {
    750
}

fn default_rate_limit_max_delay_ms() -> u64 {
    20_000
}

fn default_pause_secs() -> u64 {
    30
}

/// Resolve which TOML file to read
///
/// Priority: explicit path → `LEXV_CONFIG` → `<config dir>/lexv/config.toml`.
/// Returns `None` when no candidate exists on disk.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("lexv").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load configuration, falling back to defaults when no file is available
///
/// An explicitly named file that does not exist is an error; the implicit
/// platform location is optional.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    let explicit = cli_path.is_some() || std::env::var(CONFIG_ENV_VAR).is_ok();

    let Some(path) = resolve_config_path(cli_path) else {
        warn!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        if explicit {
            return Err(Error::NotFound(format!(
                "config file {}",
                path.display()
            )));
        }
        warn!("Config file {} missing, using built-in defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

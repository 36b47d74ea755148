//! Client configuration.
//!
//! # Responsibility
//! - Load settings from an optional TOML file, then apply `SPRINGMEMO_*`
//!   environment overrides.
//! - Validate values before any session or store is created.
//!
//! # Invariants
//! - The autosave quiet period is strictly positive.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Quiet period used when nothing else is configured.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 5_000;
const DEFAULT_DB_FILE: &str = "springmemo.sqlite3";

const ENV_DB_PATH: &str = "SPRINGMEMO_DB_PATH";
const ENV_LOG_LEVEL: &str = "SPRINGMEMO_LOG_LEVEL";
const ENV_LOG_DIR: &str = "SPRINGMEMO_LOG_DIR";
const ENV_QUIET_PERIOD_MS: &str = "SPRINGMEMO_QUIET_PERIOD_MS";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(details) => write!(f, "invalid config value: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Autosave tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Time without edits before a save fires.
    pub quiet_period_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
        }
    }
}

impl AutosaveConfig {
    pub fn with_quiet_period(quiet_period: Duration) -> Self {
        Self {
            quiet_period_ms: u64::try_from(quiet_period.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

/// Top-level client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Local memo store file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` keeps logging off.
    pub log_dir: Option<PathBuf>,
    pub autosave: AutosaveConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            autosave: AutosaveConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(ConfigError::Parse)
    }

    /// Applies overrides from a key lookup (the process environment in
    /// `load_config`).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v;
        }
        if let Some(v) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup(ENV_QUIET_PERIOD_MS) {
            self.autosave.quiet_period_ms = v.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_QUIET_PERIOD_MS} must be an integer, got `{v}`"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autosave.quiet_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "autosave.quiet_period_ms must be greater than zero".to_string(),
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Loads settings: defaults, then the optional file, then the environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            AppConfig::from_toml_str(&raw)?
        }
        None => AppConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

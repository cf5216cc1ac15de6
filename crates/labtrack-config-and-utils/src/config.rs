//! Configuration management.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default maximum pooled connections.
pub const DEFAULT_POOL_MAX_SIZE: u32 = 8;

/// Default time a statement waits on a locked database.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// How a move's declared `from_location` is checked against the sample's
/// recorded location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPolicy {
    /// Log the declared origin as-is and warn on mismatch.
    #[default]
    Permissive,
    /// Reject the move on mismatch.
    Strict,
}

impl LocationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Some(Self::Permissive),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Database file. Falls back to [`Paths::database_file`] when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Handling of mismatched `from_location` on moves.
    #[serde(default)]
    pub location_policy: LocationPolicy,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_pool_max_size() -> u32 {
    DEFAULT_POOL_MAX_SIZE
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            database_path: None,
            location_policy: LocationPolicy::default(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load configuration from `paths.config_file()` if present, falling back
    /// to defaults, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Resolve the database path, defaulting under `paths`.
    pub fn database_path(&self, paths: &Paths) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| paths.database_file())
    }

    /// Override fields from `LABTRACK_*` variables supplied by `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> CoreResult<()> {
        if let Some(log_level) = lookup("LABTRACK_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(db_path) = lookup("LABTRACK_DB_PATH") {
            self.database_path = Some(PathBuf::from(db_path));
        }
        if let Some(raw) = lookup("LABTRACK_LOCATION_POLICY") {
            self.location_policy = LocationPolicy::parse(&raw).ok_or_else(|| {
                CoreError::Config(format!("unknown location policy: {raw}"))
            })?;
        }
        Ok(())
    }

    /// Check values that cannot be represented by the store.
    ///
    /// [`Config::load`] runs this; callers that build a `Config` by hand
    /// should too.
    pub fn validate(&self) -> CoreResult<()> {
        if self.pool_max_size == 0 {
            return Err(CoreError::Config(
                "pool_max_size must be at least 1".to_string(),
            ));
        }
        if self.busy_timeout_ms > i32::MAX as u64 {
            return Err(CoreError::Config(format!(
                "busy_timeout_ms must be at most {}",
                i32::MAX
            )));
        }
        Ok(())
    }
}

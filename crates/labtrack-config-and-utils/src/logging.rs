//! Logging initialization.
//!
//! Bridges [`Config`] into the observability crate so every labtrack process
//! writes the same JSONL stream.

use crate::{Config, CoreResult, Paths};
use observability::LogConfig;
use std::path::PathBuf;

/// Initialize logging for `service_name` using the configured level.
///
/// Logs go to `paths.log_file()`; `RUST_LOG` still takes precedence over
/// `config.log_level`. Returns the log file path.
///
/// ```ignore
/// let paths = Paths::new()?;
/// let config = Config::load(&paths)?;
/// init_logging(&config, &paths, "labtrack")?;
/// tracing::info!("ledger ready");
/// ```
pub fn init_logging(config: &Config, paths: &Paths, service_name: &str) -> CoreResult<PathBuf> {
    let path = observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(&config.log_level).as_str().to_ascii_lowercase(),
        log_path: Some(paths.log_file()),
        also_stderr: std::env::var("LABTRACK_LOG_STDERR").is_ok_and(|v| v == "1"),
    })?;
    Ok(path)
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

//! # Observability
//!
//! Structured logging for labtrack services.
//!
//! Library crates only ever use `tracing` macros. The process that embeds
//! them calls [`init_with_config`] once at startup and decides where logs
//! go. Every event becomes one JSON object per line in
//! `~/.labtrack/logs/labtrack.jsonl` (or the configured path):
//!
//! - `tail -f ~/.labtrack/logs/labtrack.jsonl | jq` for pretty JSON
//! - `jq 'select(.sample_id == "PLATE_001")'` to follow one sample
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "labtrack".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! })?;
//! tracing::info!("ready");
//! ```

mod json_layer;
mod writer;

use std::path::PathBuf;

pub use json_layer::{JsonLayer, LogLine, SAMPLE_ID_FIELD};
pub use writer::{default_log_path, CentralLogWriter, WriterFactory};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.labtrack/logs/labtrack.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("could not determine home directory for the default log path")]
    NoHomeDir,

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Initialize logging with default settings for `service_name`.
pub fn init(service_name: &str) -> Result<PathBuf, ObservabilityError> {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    })
}

/// Initialize logging with custom configuration.
///
/// Returns the log file path in use. Fails if the file cannot be opened or
/// if a global subscriber was already installed in this process.
pub fn init_with_config(config: LogConfig) -> Result<PathBuf, ObservabilityError> {
    let log_path = writer::install(&config)?;
    tracing::info!(
        service = %config.service_name,
        log_path = %log_path.display(),
        "observability initialized"
    );
    Ok(log_path)
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;

//! Configuration, paths and logging setup for labtrack.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, LocationPolicy, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_LOG_LEVEL, DEFAULT_POOL_MAX_SIZE};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;

//! File system paths for labtrack.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for all labtrack files (~/.labtrack)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.labtrack`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".labtrack"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.labtrack).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.labtrack/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the default database path (~/.labtrack/data/lab_samples.sqlite).
    pub fn database_file(&self) -> PathBuf {
        self.data_dir().join("lab_samples.sqlite")
    }

    /// Get the data directory (~/.labtrack/data).
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the logs directory (~/.labtrack/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the JSONL log file path (~/.labtrack/logs/labtrack.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("labtrack.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_layout() {
        let paths = Paths::with_base_dir(PathBuf::from("/tmp/labtrack-test"));
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/tmp/labtrack-test/config.json")
        );
        assert_eq!(
            paths.database_file(),
            PathBuf::from("/tmp/labtrack-test/data/lab_samples.sqlite")
        );
        assert_eq!(
            paths.log_file(),
            PathBuf::from("/tmp/labtrack-test/logs/labtrack.jsonl")
        );
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("labtrack"));
        paths.ensure_dirs().unwrap();
        assert!(paths.data_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
    }
}

//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Store error type.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage target could not be created, opened or initialized.
    #[error("Storage init error at {path}: {reason}")]
    Init { path: PathBuf, reason: String },

    /// SQLite failure while running a statement or transaction.
    ///
    /// The enclosing transaction has been rolled back.
    #[error("Transaction error: {0}")]
    Transaction(#[source] rusqlite::Error),

    /// No pooled connection could be acquired.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A persisted row could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StoreError {
    pub(crate) fn init(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Init {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the failed operation may be retried as a whole.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transaction(_) | Self::Connection(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => Self::InvalidData(e.to_string()),
            other => Self::Transaction(other),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        Self::Connection(e.to_string())
    }
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

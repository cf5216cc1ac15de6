//! Pooled, transactional handle over the sample ledger database.
//!
//! SQLite runs in WAL mode: readers proceed concurrently with the single
//! writer, and writers are serialized by SQLite itself. Every mutation goes
//! through [`Store::run_transaction`], which takes the write lock up front
//! (`BEGIN IMMEDIATE`) and either commits all of its statements or none.

use crate::{schema, SampleFilter, Sample, SampleId, StoreError, StoreResult};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum connections in the pool.
    pub max_size: u32,
    /// Minimum idle connections to maintain.
    pub min_idle: Option<u32>,
    /// Connection acquisition timeout.
    pub connection_timeout: Duration,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            min_idle: Some(1),
            connection_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl PoolConfig {
    /// Rejects settings that r2d2 or SQLite would refuse.
    fn check(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("pool max_size must be at least 1".to_string());
        }
        if let Some(min_idle) = self.min_idle {
            if min_idle > self.max_size {
                return Err(format!(
                    "pool min_idle ({min_idle}) exceeds max_size ({})",
                    self.max_size
                ));
            }
        }
        if self.busy_timeout.as_millis() > i32::MAX as u128 {
            return Err(format!(
                "busy timeout of {}ms exceeds the SQLite limit",
                self.busy_timeout.as_millis()
            ));
        }
        Ok(())
    }
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone)]
pub struct PoolState {
    /// Total connections (active + idle).
    pub connections: u32,
    /// Currently idle connections.
    pub idle_connections: u32,
}

/// Owned handle to the sample ledger.
///
/// There is no global connection: whoever opens the store owns it and shares
/// it (typically as `Arc<Store>`) with the components that need it.
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl Store {
    /// Open the store at the given path.
    ///
    /// This will:
    /// - Create the parent directory and database file if they don't exist
    /// - Enable WAL mode
    /// - Create the sample, movement and result tables if absent
    /// - Initialize the connection pool
    ///
    /// Any failure is reported as [`StoreError::Init`].
    pub fn open(path: impl AsRef<Path>, config: PoolConfig) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        config.check().map_err(|reason| StoreError::init(&path, reason))?;
        initialize(&path, config.busy_timeout)?;

        let busy_timeout = config.busy_timeout;
        let manager = SqliteConnectionManager::file(&path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch(
                "
                PRAGMA foreign_keys = ON;
                PRAGMA synchronous = FULL;
                PRAGMA temp_store = MEMORY;
            ",
            )
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| StoreError::init(&path, e))?;

        info!(
            path = %path.display(),
            max_size = config.max_size,
            "Sample store opened"
        );

        Ok(Self { pool, path })
    }

    /// Get a connection from the pool.
    ///
    /// Blocks until a connection is available or the timeout is reached.
    pub fn connection(&self) -> StoreResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Run `work` as one atomic write transaction.
    ///
    /// Commits if `work` returns `Ok`. On any error, from `work` or from the
    /// commit itself, the transaction is rolled back and the store is left as
    /// if it never ran.
    pub fn run_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.with_transaction(TransactionBehavior::Immediate, work)
    }

    /// Run `work` inside a read transaction.
    ///
    /// All statements in `work` observe the same committed snapshot.
    pub fn read_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.with_transaction(TransactionBehavior::Deferred, work)
    }

    fn with_transaction<T, E, F>(&self, behavior: TransactionBehavior, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(StoreError::from)?;

        // Dropping `tx` on the error path rolls it back.
        let value = work(&tx)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }

    /// Get a sample by ID outside of any explicit transaction.
    pub fn get_sample(&self, id: &SampleId) -> StoreResult<Option<Sample>> {
        let conn = self.connection()?;
        crate::queries::get_sample(&conn, id)
    }

    /// List samples matching `filter` with a single statement.
    pub fn query_samples(&self, filter: &SampleFilter) -> StoreResult<Vec<Sample>> {
        let conn = self.connection()?;
        crate::queries::list_samples(&conn, filter)
    }

    /// Get pool statistics for monitoring.
    pub fn state(&self) -> PoolState {
        let state = self.pool.state();
        PoolState {
            connections: state.connections,
            idle_connections: state.idle_connections,
        }
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the store is healthy by acquiring and releasing a connection.
    pub fn health_check(&self) -> StoreResult<()> {
        let conn = self.connection()?;
        conn.execute_batch("SELECT 1")?;
        debug!("Sample store health check passed");
        Ok(())
    }
}

/// Create the storage target and its collections on a dedicated connection.
fn initialize(path: &Path, busy_timeout: Duration) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::init(path, e))?;
        }
    }

    let conn = Connection::open(path).map_err(|e| StoreError::init(path, e))?;
    conn.busy_timeout(busy_timeout)
        .map_err(|e| StoreError::init(path, e))?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")
        .map_err(|e| StoreError::init(path, e))?;
    schema::initialize(&conn).map_err(|e| StoreError::init(path, e))?;
    Ok(())
}

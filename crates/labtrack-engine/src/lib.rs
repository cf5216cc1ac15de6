//! # Labtrack Engine
//!
//! Sample lifecycle and audit trail over the SQLite ledger.
//!
//! ## Principles
//!
//! - **SQLite is the only durable store**: every mutation commits there first
//! - **Logs are append-only**: movements and results are never edited
//! - **Compound writes are atomic**: a log row and the sample columns it
//!   implies commit together
//! - **Side-effects reflect committed reality**: emitted after commit, never
//!   on failure
//!
//! ## Example
//!
//! ```rust,ignore
//! use labtrack_engine::{
//!     NewMovement, NewResult, NewSample, RecordingSink, SampleReader, SampleWriter, Tracker,
//! };
//!
//! let tracker = Tracker::new(Arc::new(store), RecordingSink::new());
//! tracker.register_sample(NewSample::new("PLATE_001", "cell_culture", "Storage_A1"))?;
//! tracker.move_sample(
//!     &"PLATE_001".into(),
//!     NewMovement::new("Storage_A1", "Incubator_37C", "Robot_ARM1"),
//! )?;
//! tracker.record_result(
//!     &"PLATE_001".into(),
//!     NewResult::new("viability", 94.5, "percent", "Vi-CELL"),
//! )?;
//!
//! let history = tracker.get_history(&"PLATE_001".into())?.unwrap();
//! assert_eq!(history.movements.len(), 1);
//! ```
//!
//! ## Crate Structure
//!
//! - [`lifecycle`] - The engine that applies state transitions
//! - [`history`] - Snapshot-consistent reads
//! - [`writer`] / [`reader`] - The operation traits
//! - [`side_effect`] - Post-commit notifications
//! - [`types`] - Read-side views

pub mod clock;
pub mod history;
pub mod lifecycle;
pub mod reader;
pub mod side_effect;
pub mod types;
pub mod writer;

#[cfg(test)]
mod tests;

use labtrack_config_and_utils::{Config, Paths};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use crate::history::HistoryReader;
pub use crate::lifecycle::LifecycleEngine;
pub use clock::{Clock, SystemClock};
pub use labtrack_config_and_utils::LocationPolicy;
pub use labtrack_store::{
    AnalysisResult, Movement, NewMovement, NewResult, NewSample, PoolConfig, Sample, SampleId,
    SampleStatus, Store, StoreError,
};
pub use reader::SampleReader;
pub use side_effect::{NullSink, RecordingSink, SideEffect, SideEffectSink, TracingSink};
pub use types::{LocationEntry, SampleHistory, SampleSummary, TimelineEntry};
pub use writer::SampleWriter;

/// Errors raised by lifecycle operations and history reads.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The store failed to open or a transaction failed and was rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// A sample with this id is already registered.
    #[error("sample already registered: {0}")]
    DuplicateSample(SampleId),

    /// No sample with this id exists.
    #[error("sample not found: {0}")]
    SampleNotFound(SampleId),

    /// Strict policy only.
    #[error("sample {sample_id} is at {actual}, move declared {declared}")]
    LocationMismatch {
        sample_id: SampleId,
        declared: String,
        actual: String,
    },
}

impl TrackerError {
    /// True when the whole operation may be retried unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_transient())
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Engine and reader sharing one store.
pub struct Tracker<S: SideEffectSink> {
    engine: LifecycleEngine<S>,
    reader: HistoryReader,
}

impl<S: SideEffectSink> Tracker<S> {
    pub fn new(store: Arc<Store>, sink: S) -> Self {
        Self {
            reader: HistoryReader::new(Arc::clone(&store)),
            engine: LifecycleEngine::new(store, sink),
        }
    }

    pub fn with_policy(mut self, policy: LocationPolicy) -> Self {
        self.engine = self.engine.with_policy(policy);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.engine = self.engine.with_clock(clock);
        self
    }

    pub fn engine(&self) -> &LifecycleEngine<S> {
        &self.engine
    }

    pub fn reader(&self) -> &HistoryReader {
        &self.reader
    }

    pub fn sink(&self) -> &S {
        self.engine.sink()
    }

    pub fn store(&self) -> &Arc<Store> {
        self.engine.store()
    }
}

impl<S: SideEffectSink> SampleWriter for Tracker<S> {
    fn register_sample(&self, sample: NewSample) -> TrackerResult<Sample> {
        self.engine.register_sample(sample)
    }

    fn move_sample(&self, id: &SampleId, movement: NewMovement) -> TrackerResult<Movement> {
        self.engine.move_sample(id, movement)
    }

    fn record_result(&self, id: &SampleId, result: NewResult) -> TrackerResult<AnalysisResult> {
        self.engine.record_result(id, result)
    }
}

impl<S: SideEffectSink> SampleReader for Tracker<S> {
    fn get_sample(&self, id: &SampleId) -> TrackerResult<Option<Sample>> {
        self.reader.get_sample(id)
    }

    fn get_history(&self, id: &SampleId) -> TrackerResult<Option<SampleHistory>> {
        self.reader.get_history(id)
    }

    fn list_by_location(&self, location: &str) -> TrackerResult<Vec<LocationEntry>> {
        self.reader.list_by_location(location)
    }

    fn list_by_status(&self, status: SampleStatus) -> TrackerResult<Vec<SampleSummary>> {
        self.reader.list_by_status(status)
    }

    fn list_all(&self) -> TrackerResult<Vec<SampleSummary>> {
        self.reader.list_all()
    }
}

/// Opens the store described by `config` and wires up a [`Tracker`].
///
/// The database lives at `config.database_path` or, when unset, under
/// `paths`. Pool size, busy timeout and location policy come from `config`.
/// An invalid `config` is reported as [`StoreError::Init`] before anything
/// is opened.
pub fn open<S: SideEffectSink>(config: &Config, paths: &Paths, sink: S) -> TrackerResult<Tracker<S>> {
    let db_path = config.database_path(paths);
    config.validate().map_err(|e| StoreError::Init {
        path: db_path.clone(),
        reason: e.to_string(),
    })?;
    let pool = PoolConfig {
        max_size: config.pool_max_size,
        busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        ..PoolConfig::default()
    };
    let store = Store::open(&db_path, pool)?;
    info!(
        path = %db_path.display(),
        policy = config.location_policy.as_str(),
        "tracker opened"
    );
    Ok(Tracker::new(Arc::new(store), sink).with_policy(config.location_policy))
}

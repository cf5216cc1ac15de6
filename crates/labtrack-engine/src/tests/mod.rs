//! Behavior tests for the lifecycle engine and history reader.
//!
//! - `lifecycle.rs`    - State transitions and the PLATE_001 walkthrough
//! - `history.rs`      - Audit trail reads and listings
//! - `failures.rs`     - Rejected operations leave the store unchanged
//! - `ordering.rs`     - Timestamp order and replay determinism
//! - `concurrency.rs`  - Shared engine across threads
//! - `durability.rs`   - Data survives reopening the database
//! - `side_effects.rs` - Post-commit notifications

mod concurrency;
mod lifecycle;

use crate::clock::Clock;
use crate::reader::SampleReader;
use crate::side_effect::RecordingSink;
use crate::writer::SampleWriter;
use crate::{LocationPolicy, NewMovement, NewResult, NewSample, SampleStatus, Store, Tracker};
use chrono::{DateTime, Duration, TimeZone, Utc};
use labtrack_store::PoolConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A tracker over a throwaway on-disk database.
pub(crate) struct Harness {
    pub dir: TempDir,
    pub tracker: Tracker<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(LocationPolicy::Permissive)
    }

    pub fn with_policy(policy: LocationPolicy) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tracker = open_tracker(&db_path(&dir), policy);
        Self { dir, tracker }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.tracker = self.tracker.with_clock(clock);
        self
    }

    pub fn db_path(&self) -> PathBuf {
        db_path(&self.dir)
    }

    /// Drops the current tracker and opens a fresh one on the same file.
    pub fn reopen(self) -> Self {
        let Harness { dir, tracker } = self;
        let policy = tracker.engine().policy();
        drop(tracker);
        let tracker = open_tracker(&db_path(&dir), policy);
        Self { dir, tracker }
    }

    pub fn sink(&self) -> &RecordingSink {
        self.tracker.sink()
    }
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("lab_samples.sqlite")
}

fn open_tracker(path: &Path, policy: LocationPolicy) -> Tracker<RecordingSink> {
    let store = Store::open(path, PoolConfig::default()).unwrap();
    Tracker::new(Arc::new(store), RecordingSink::new()).with_policy(policy)
}

/// A clock that only moves when told to.
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
}

/// Runs the PLATE_001 walkthrough: register, move to the incubator, record viability.
pub(crate) fn run_plate_scenario<W: SampleWriter>(writer: &W) {
    writer
        .register_sample(NewSample::new("PLATE_001", "cell_culture", "Storage_A1"))
        .unwrap();
    writer
        .move_sample(
            &"PLATE_001".into(),
            NewMovement::new("Storage_A1", "Incubator_37C", "Robot_ARM1"),
        )
        .unwrap();
    writer
        .record_result(
            &"PLATE_001".into(),
            NewResult::new("viability", 94.5, "percent", "Vi-CELL"),
        )
        .unwrap();
}

#[test]
fn basic_workflow() {
    let h = Harness::new();
    run_plate_scenario(&h.tracker);

    let sample = h.tracker.get_sample(&"PLATE_001".into()).unwrap().unwrap();
    assert_eq!(sample.current_location, "Incubator_37C");
    assert_eq!(sample.status, SampleStatus::Analyzed);

    let history = h.tracker.get_history(&"PLATE_001".into()).unwrap().unwrap();
    assert_eq!(history.movements.len(), 1);
    assert_eq!(history.results.len(), 1);
    assert_eq!(h.sink().len(), 3);
}

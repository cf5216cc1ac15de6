//! The lifecycle engine.
//!
//! Each mutation is a compound write: the log row and the derived sample
//! columns commit together or not at all.
//!
//! ```text
//! WRITE:
//!   BEGIN IMMEDIATE → append log row → update sample → COMMIT → side-effect
//! ```

use crate::clock::{Clock, SystemClock};
use crate::side_effect::{SideEffect, SideEffectSink};
use crate::writer::SampleWriter;
use crate::{LocationPolicy, TrackerError, TrackerResult};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use labtrack_store::{
    queries, AnalysisResult, Movement, NewMovement, NewResult, NewSample, Sample, SampleId, Store,
};
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, warn};

/// Drives the sample state machine over a shared [`Store`].
///
/// `Send + Sync` whenever the sink is, so one engine can be shared by
/// `Arc` across threads.
pub struct LifecycleEngine<S: SideEffectSink> {
    store: Arc<Store>,
    sink: S,
    policy: LocationPolicy,
    clock: Arc<dyn Clock>,
}

impl<S: SideEffectSink> LifecycleEngine<S> {
    /// Creates an engine with the permissive location policy and the system clock.
    pub fn new(store: Arc<Store>, sink: S) -> Self {
        Self {
            store,
            sink,
            policy: LocationPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: LocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns a reference to the side-effect sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn policy(&self) -> LocationPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    /// Timestamp for the next log row of `id`.
    ///
    /// Strictly after everything already in the sample's trail, even when
    /// the clock stalls or steps backwards.
    fn stamp(&self, conn: &Connection, id: &SampleId) -> TrackerResult<DateTime<Utc>> {
        let now = self.now();
        let stamped = match queries::latest_event_timestamp(conn, id)? {
            Some(latest) if now <= latest => latest + Duration::microseconds(1),
            _ => now,
        };
        Ok(stamped)
    }

    fn check_origin(&self, sample: &Sample, movement: &NewMovement) -> TrackerResult<()> {
        if sample.current_location == movement.from_location {
            return Ok(());
        }
        match self.policy {
            LocationPolicy::Strict => Err(TrackerError::LocationMismatch {
                sample_id: sample.sample_id.clone(),
                declared: movement.from_location.clone(),
                actual: sample.current_location.clone(),
            }),
            LocationPolicy::Permissive => {
                warn!(
                    sample_id = %sample.sample_id,
                    declared = %movement.from_location,
                    actual = %sample.current_location,
                    "move declared a different origin than the recorded location"
                );
                Ok(())
            }
        }
    }
}

impl<S: SideEffectSink> SampleWriter for LifecycleEngine<S> {
    fn register_sample(&self, sample: NewSample) -> TrackerResult<Sample> {
        let created_at = self.now();
        let registered = self.store.run_transaction(|tx| -> TrackerResult<Sample> {
            if queries::sample_exists(tx, &sample.sample_id)? {
                return Err(TrackerError::DuplicateSample(sample.sample_id.clone()));
            }
            Ok(queries::insert_sample(tx, &sample, created_at)?)
        })?;

        debug!(
            sample_id = %registered.sample_id,
            location = %registered.current_location,
            "sample registered"
        );
        self.sink.emit(SideEffect::SampleRegistered {
            sample_id: registered.sample_id.clone(),
            location: registered.current_location.clone(),
        });

        Ok(registered)
    }

    fn move_sample(&self, id: &SampleId, movement: NewMovement) -> TrackerResult<Movement> {
        let recorded = self.store.run_transaction(|tx| -> TrackerResult<Movement> {
            let sample = queries::get_sample(tx, id)?
                .ok_or_else(|| TrackerError::SampleNotFound(id.clone()))?;
            self.check_origin(&sample, &movement)?;

            let timestamp = self.stamp(tx, id)?;
            let recorded = queries::insert_movement(tx, id, &movement, timestamp)?;
            queries::update_sample_location(
                tx,
                id,
                &recorded.to_location,
                sample.status.after_movement(),
            )?;
            Ok(recorded)
        })?;

        debug!(
            sample_id = %id,
            movement_id = recorded.id,
            from = %recorded.from_location,
            to = %recorded.to_location,
            "sample moved"
        );
        self.sink.emit(SideEffect::SampleMoved {
            sample_id: id.clone(),
            movement_id: recorded.id,
            from_location: recorded.from_location.clone(),
            to_location: recorded.to_location.clone(),
        });

        Ok(recorded)
    }

    fn record_result(&self, id: &SampleId, result: NewResult) -> TrackerResult<AnalysisResult> {
        let recorded = self
            .store
            .run_transaction(|tx| -> TrackerResult<AnalysisResult> {
                let sample = queries::get_sample(tx, id)?
                    .ok_or_else(|| TrackerError::SampleNotFound(id.clone()))?;

                let timestamp = self.stamp(tx, id)?;
                let recorded = queries::insert_result(tx, id, &result, timestamp)?;
                queries::update_sample_status(tx, id, sample.status.after_result())?;
                Ok(recorded)
            })?;

        debug!(
            sample_id = %id,
            result_id = recorded.id,
            assay_type = %recorded.assay_type,
            "result recorded"
        );
        self.sink.emit(SideEffect::ResultRecorded {
            sample_id: id.clone(),
            result_id: recorded.id,
            assay_type: recorded.assay_type.clone(),
        });

        Ok(recorded)
    }
}

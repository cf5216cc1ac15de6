//! Write-side trait for the lifecycle engine.
//!
//! Every operation commits one SQLite transaction. Derived columns
//! (`current_location`, `status`) change in the same transaction as the log
//! row that justifies them, and side-effects are emitted only after commit.

use crate::TrackerError;
use labtrack_store::{AnalysisResult, Movement, NewMovement, NewResult, NewSample, Sample, SampleId};

/// A writer for sample lifecycle events.
pub trait SampleWriter {
    /// Registers a new sample at its initial location with status `registered`.
    ///
    /// Fails with [`TrackerError::DuplicateSample`] if the id is taken.
    fn register_sample(&self, sample: NewSample) -> Result<Sample, TrackerError>;

    /// Appends a movement and relocates the sample, marking it `in_transit`.
    ///
    /// Fails with [`TrackerError::SampleNotFound`] for unknown ids, and with
    /// [`TrackerError::LocationMismatch`] under the strict location policy.
    fn move_sample(&self, id: &SampleId, movement: NewMovement) -> Result<Movement, TrackerError>;

    /// Appends an analysis result and marks the sample `analyzed`.
    ///
    /// The sample's location is never touched.
    fn record_result(&self, id: &SampleId, result: NewResult)
        -> Result<AnalysisResult, TrackerError>;
}

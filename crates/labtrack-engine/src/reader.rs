//! Read-side trait for sample state and audit trails.
//!
//! Reads never emit side-effects. A missing sample is `Ok(None)`, not an
//! error.

use crate::types::{LocationEntry, SampleHistory, SampleSummary};
use crate::TrackerError;
use labtrack_store::{Sample, SampleId, SampleStatus};

/// A reader for samples and their history.
pub trait SampleReader {
    /// Returns the current state of a sample.
    fn get_sample(&self, id: &SampleId) -> Result<Option<Sample>, TrackerError>;

    /// Returns the sample with its movements and results, read from one snapshot.
    fn get_history(&self, id: &SampleId) -> Result<Option<SampleHistory>, TrackerError>;

    /// Lists samples whose current location equals `location` exactly.
    fn list_by_location(&self, location: &str) -> Result<Vec<LocationEntry>, TrackerError>;

    /// Lists samples currently in `status`.
    fn list_by_status(&self, status: SampleStatus) -> Result<Vec<SampleSummary>, TrackerError>;

    /// Lists every sample in registration order.
    fn list_all(&self) -> Result<Vec<SampleSummary>, TrackerError>;
}

//! The history reader.

use crate::reader::SampleReader;
use crate::types::{LocationEntry, SampleHistory, SampleSummary};
use crate::TrackerResult;
use labtrack_store::{queries, Sample, SampleFilter, SampleId, SampleStatus, Store};
use std::sync::Arc;
use tracing::debug;

/// Answers queries about current state and full audit trails.
///
/// Holds the same [`Store`] as the engine. Listings are single statements;
/// `get_history` reads the sample and both logs inside one read transaction.
#[derive(Clone)]
pub struct HistoryReader {
    store: Arc<Store>,
}

impl HistoryReader {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn query(&self, filter: SampleFilter) -> TrackerResult<Vec<Sample>> {
        Ok(self.store.query_samples(&filter)?)
    }
}

impl SampleReader for HistoryReader {
    fn get_sample(&self, id: &SampleId) -> TrackerResult<Option<Sample>> {
        Ok(self.store.get_sample(id)?)
    }

    fn get_history(&self, id: &SampleId) -> TrackerResult<Option<SampleHistory>> {
        self.store
            .read_transaction(|tx| -> TrackerResult<Option<SampleHistory>> {
                let Some(sample) = queries::get_sample(tx, id)? else {
                    return Ok(None);
                };
                let movements = queries::list_movements(tx, id)?;
                let results = queries::list_results(tx, id)?;
                debug!(
                    sample_id = %id,
                    movements = movements.len(),
                    results = results.len(),
                    "history loaded"
                );
                Ok(Some(SampleHistory {
                    sample,
                    movements,
                    results,
                }))
            })
    }

    fn list_by_location(&self, location: &str) -> TrackerResult<Vec<LocationEntry>> {
        let samples = self.query(SampleFilter::AtLocation(location.to_string()))?;
        Ok(samples.into_iter().map(LocationEntry::from).collect())
    }

    fn list_by_status(&self, status: SampleStatus) -> TrackerResult<Vec<SampleSummary>> {
        let samples = self.query(SampleFilter::WithStatus(status))?;
        Ok(samples.into_iter().map(SampleSummary::from).collect())
    }

    fn list_all(&self) -> TrackerResult<Vec<SampleSummary>> {
        let samples = self.query(SampleFilter::All)?;
        Ok(samples.into_iter().map(SampleSummary::from).collect())
    }
}

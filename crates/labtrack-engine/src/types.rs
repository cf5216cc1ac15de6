//! Read-side views assembled by the history reader.

use chrono::{DateTime, Utc};
use labtrack_store::{AnalysisResult, Movement, Sample, SampleId, SampleStatus};
use serde::{Deserialize, Serialize};

/// A sample together with its complete audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleHistory {
    pub sample: Sample,
    /// Movements in timestamp order.
    pub movements: Vec<Movement>,
    /// Results in timestamp order.
    pub results: Vec<AnalysisResult>,
}

impl SampleHistory {
    /// Registration, movements and results merged into one time-ordered trail.
    ///
    /// Registration is always first. Entries with equal timestamps keep
    /// movements ahead of results.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let mut entries = Vec::with_capacity(1 + self.movements.len() + self.results.len());
        entries.push(TimelineEntry::Registered {
            at: self.sample.created_at,
            sample_type: self.sample.sample_type.clone(),
        });

        let mut movements = self.movements.iter().peekable();
        let mut results = self.results.iter().peekable();
        loop {
            let take_movement = match (movements.peek(), results.peek()) {
                (Some(m), Some(r)) => m.timestamp <= r.timestamp,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            if take_movement {
                if let Some(m) = movements.next() {
                    entries.push(TimelineEntry::Moved(m.clone()));
                }
            } else if let Some(r) = results.next() {
                entries.push(TimelineEntry::Analyzed(r.clone()));
            }
        }
        entries
    }
}

/// One step of a sample's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    Registered {
        at: DateTime<Utc>,
        sample_type: String,
    },
    Moved(Movement),
    Analyzed(AnalysisResult),
}

impl TimelineEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Registered { at, .. } => *at,
            Self::Moved(m) => m.timestamp,
            Self::Analyzed(r) => r.timestamp,
        }
    }
}

/// A sample found at a queried location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub sample_id: SampleId,
    pub sample_type: String,
    pub status: SampleStatus,
}

impl From<Sample> for LocationEntry {
    fn from(sample: Sample) -> Self {
        Self {
            sample_id: sample.sample_id,
            sample_type: sample.sample_type,
            status: sample.status,
        }
    }
}

/// One line of the all-samples summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub sample_id: SampleId,
    pub sample_type: String,
    pub current_location: String,
    pub status: SampleStatus,
}

impl From<Sample> for SampleSummary {
    fn from(sample: Sample) -> Self {
        Self {
            sample_id: sample.sample_id,
            sample_type: sample.sample_type,
            current_location: sample.current_location,
            status: sample.status,
        }
    }
}

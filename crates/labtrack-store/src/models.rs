//! Record types for the three stored collections.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Caller-assigned identifier of a physical sample.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleId(pub String);

impl SampleId {
    /// Returns the sample ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SampleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SampleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of a sample.
///
/// ```text
/// registered --move--> in_transit --result--> analyzed --move--> in_transit
///      \_____________result____________________^   ^__result__/
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    #[default]
    Registered,
    InTransit,
    Analyzed,
}

impl SampleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::InTransit => "in_transit",
            Self::Analyzed => "analyzed",
        }
    }

    /// Parses the persisted representation. Unknown values are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(Self::Registered),
            "in_transit" => Some(Self::InTransit),
            "analyzed" => Some(Self::Analyzed),
            _ => None,
        }
    }

    /// Status after the sample is physically moved.
    pub fn after_movement(self) -> Self {
        Self::InTransit
    }

    /// Status after an analysis result is recorded.
    pub fn after_result(self) -> Self {
        Self::Analyzed
    }
}

impl std::fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for SampleStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SampleStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        Self::parse(raw).ok_or_else(|| {
            FromSqlError::Other(format!("unknown sample status: {raw}").into())
        })
    }
}

/// A sample row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub sample_id: SampleId,
    pub sample_type: String,
    pub created_at: DateTime<Utc>,
    pub current_location: String,
    pub status: SampleStatus,
    pub metadata: Option<serde_json::Value>,
}

/// A sample to be registered.
#[derive(Debug, Clone)]
pub struct NewSample {
    pub sample_id: SampleId,
    pub sample_type: String,
    pub location: String,
    pub metadata: Option<serde_json::Value>,
}

impl NewSample {
    pub fn new(
        sample_id: impl Into<SampleId>,
        sample_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            sample_id: sample_id.into(),
            sample_type: sample_type.into(),
            location: location.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A movement log entry. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Insertion sequence assigned by SQLite.
    pub id: i64,
    pub sample_id: SampleId,
    pub timestamp: DateTime<Utc>,
    pub from_location: String,
    pub to_location: String,
    pub actor_id: String,
}

/// A movement to be appended. The timestamp is assigned at write time.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub from_location: String,
    pub to_location: String,
    pub actor_id: String,
}

impl NewMovement {
    pub fn new(
        from_location: impl Into<String>,
        to_location: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            from_location: from_location.into(),
            to_location: to_location.into(),
            actor_id: actor_id.into(),
        }
    }
}

/// An analysis result log entry. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Insertion sequence assigned by SQLite.
    pub id: i64,
    pub sample_id: SampleId,
    pub timestamp: DateTime<Utc>,
    pub assay_type: String,
    pub value: f64,
    pub units: String,
    pub instrument_id: String,
}

/// A result to be appended. The timestamp is assigned at write time.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub assay_type: String,
    pub value: f64,
    pub units: String,
    pub instrument_id: String,
}

impl NewResult {
    pub fn new(
        assay_type: impl Into<String>,
        value: f64,
        units: impl Into<String>,
        instrument_id: impl Into<String>,
    ) -> Self {
        Self {
            assay_type: assay_type.into(),
            value,
            units: units.into(),
            instrument_id: instrument_id.into(),
        }
    }
}

/// Typed predicate for sample listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleFilter {
    All,
    AtLocation(String),
    WithStatus(SampleStatus),
}

/// Formats a timestamp for storage.
///
/// Fixed-width UTC with microseconds, so text order equals time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

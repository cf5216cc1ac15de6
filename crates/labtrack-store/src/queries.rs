//! Statement-level helpers over a SQLite connection.
//!
//! These run against whatever connection they are handed. Inside
//! [`Store::run_transaction`](crate::Store::run_transaction) that is the open
//! transaction, so several helpers compose into one atomic unit.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    format_timestamp, parse_timestamp, AnalysisResult, Movement, NewMovement, NewResult,
    NewSample, Sample, SampleFilter, SampleId, SampleStatus,
};
use crate::StoreResult;

const SAMPLE_COLUMNS: &str =
    "sample_id, sample_type, created_at, current_location, status, metadata";

// ==========================================
// Samples
// ==========================================

/// Insert a new sample with `status = registered`.
///
/// Fails with a constraint error if the id already exists.
pub fn insert_sample(
    conn: &Connection,
    sample: &NewSample,
    created_at: DateTime<Utc>,
) -> StoreResult<Sample> {
    let metadata = sample
        .metadata
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    conn.execute(
        "INSERT INTO samples (sample_id, sample_type, created_at, current_location, status, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            sample.sample_id.as_str(),
            sample.sample_type,
            format_timestamp(&created_at),
            sample.location,
            SampleStatus::Registered,
            metadata,
        ],
    )?;
    Ok(Sample {
        sample_id: sample.sample_id.clone(),
        sample_type: sample.sample_type.clone(),
        created_at,
        current_location: sample.location.clone(),
        status: SampleStatus::Registered,
        metadata: sample.metadata.clone(),
    })
}

/// Check whether a sample exists.
pub fn sample_exists(conn: &Connection, id: &SampleId) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM samples WHERE sample_id = ?1",
            params![id.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Get a sample by ID.
pub fn get_sample(conn: &Connection, id: &SampleId) -> StoreResult<Option<Sample>> {
    let sample = conn
        .query_row(
            &format!("SELECT {SAMPLE_COLUMNS} FROM samples WHERE sample_id = ?1"),
            params![id.as_str()],
            sample_from_row,
        )
        .optional()?;
    Ok(sample)
}

/// List samples matching a filter, in registration order.
pub fn list_samples(conn: &Connection, filter: &SampleFilter) -> StoreResult<Vec<Sample>> {
    let samples = match filter {
        SampleFilter::All => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SAMPLE_COLUMNS} FROM samples ORDER BY rowid"
            ))?;
            let rows = stmt.query_map([], sample_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        SampleFilter::AtLocation(location) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SAMPLE_COLUMNS} FROM samples WHERE current_location = ?1 ORDER BY rowid"
            ))?;
            let rows = stmt.query_map(params![location], sample_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        SampleFilter::WithStatus(status) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SAMPLE_COLUMNS} FROM samples WHERE status = ?1 ORDER BY rowid"
            ))?;
            let rows = stmt.query_map(params![status], sample_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Set location and status together.
pub fn update_sample_location(
    conn: &Connection,
    id: &SampleId,
    location: &str,
    status: SampleStatus,
) -> StoreResult<bool> {
    let count = conn.execute(
        "UPDATE samples SET current_location = ?1, status = ?2 WHERE sample_id = ?3",
        params![location, status, id.as_str()],
    )?;
    Ok(count > 0)
}

/// Set status only. Location is untouched.
pub fn update_sample_status(
    conn: &Connection,
    id: &SampleId,
    status: SampleStatus,
) -> StoreResult<bool> {
    let count = conn.execute(
        "UPDATE samples SET status = ?1 WHERE sample_id = ?2",
        params![status, id.as_str()],
    )?;
    Ok(count > 0)
}

/// Latest timestamp anywhere in a sample's trail (registration, movements, results).
pub fn latest_event_timestamp(
    conn: &Connection,
    id: &SampleId,
) -> StoreResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = conn.query_row(
        "SELECT MAX(ts) FROM (
            SELECT created_at AS ts FROM samples WHERE sample_id = ?1
            UNION ALL
            SELECT timestamp FROM movements WHERE sample_id = ?1
            UNION ALL
            SELECT timestamp FROM results WHERE sample_id = ?1
         )",
        params![id.as_str()],
        |row| row.get(0),
    )?;
    match raw {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| crate::StoreError::InvalidData(format!("invalid timestamp: {raw}"))),
        None => Ok(None),
    }
}

// ==========================================
// Movements
// ==========================================

/// Append a movement to the log.
pub fn insert_movement(
    conn: &Connection,
    id: &SampleId,
    movement: &NewMovement,
    timestamp: DateTime<Utc>,
) -> StoreResult<Movement> {
    conn.execute(
        "INSERT INTO movements (sample_id, timestamp, from_location, to_location, actor_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.as_str(),
            format_timestamp(&timestamp),
            movement.from_location,
            movement.to_location,
            movement.actor_id,
        ],
    )?;
    Ok(Movement {
        id: conn.last_insert_rowid(),
        sample_id: id.clone(),
        timestamp,
        from_location: movement.from_location.clone(),
        to_location: movement.to_location.clone(),
        actor_id: movement.actor_id.clone(),
    })
}

/// List movements for a sample ordered by timestamp, then insertion order.
pub fn list_movements(conn: &Connection, id: &SampleId) -> StoreResult<Vec<Movement>> {
    let mut stmt = conn.prepare(
        "SELECT id, sample_id, timestamp, from_location, to_location, actor_id
         FROM movements WHERE sample_id = ?1 ORDER BY timestamp ASC, id ASC",
    )?;
    let movements = stmt
        .query_map(params![id.as_str()], |row| {
            Ok(Movement {
                id: row.get(0)?,
                sample_id: SampleId(row.get(1)?),
                timestamp: timestamp_column(row, 2)?,
                from_location: row.get(3)?,
                to_location: row.get(4)?,
                actor_id: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(movements)
}

/// Count movements for a sample.
pub fn count_movements(conn: &Connection, id: &SampleId) -> StoreResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM movements WHERE sample_id = ?1",
        params![id.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

// ==========================================
// Results
// ==========================================

/// Append an analysis result to the log.
pub fn insert_result(
    conn: &Connection,
    id: &SampleId,
    result: &NewResult,
    timestamp: DateTime<Utc>,
) -> StoreResult<AnalysisResult> {
    conn.execute(
        "INSERT INTO results (sample_id, timestamp, assay_type, value, units, instrument_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.as_str(),
            format_timestamp(&timestamp),
            result.assay_type,
            result.value,
            result.units,
            result.instrument_id,
        ],
    )?;
    Ok(AnalysisResult {
        id: conn.last_insert_rowid(),
        sample_id: id.clone(),
        timestamp,
        assay_type: result.assay_type.clone(),
        value: result.value,
        units: result.units.clone(),
        instrument_id: result.instrument_id.clone(),
    })
}

/// List results for a sample ordered by timestamp, then insertion order.
pub fn list_results(conn: &Connection, id: &SampleId) -> StoreResult<Vec<AnalysisResult>> {
    let mut stmt = conn.prepare(
        "SELECT id, sample_id, timestamp, assay_type, value, units, instrument_id
         FROM results WHERE sample_id = ?1 ORDER BY timestamp ASC, id ASC",
    )?;
    let results = stmt
        .query_map(params![id.as_str()], |row| {
            Ok(AnalysisResult {
                id: row.get(0)?,
                sample_id: SampleId(row.get(1)?),
                timestamp: timestamp_column(row, 2)?,
                assay_type: row.get(3)?,
                value: row.get(4)?,
                units: row.get(5)?,
                instrument_id: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(results)
}

/// Count results for a sample.
pub fn count_results(conn: &Connection, id: &SampleId) -> StoreResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM results WHERE sample_id = ?1",
        params![id.as_str()],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

// ==========================================
// Row decoding
// ==========================================

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<Sample> {
    Ok(Sample {
        sample_id: SampleId(row.get(0)?),
        sample_type: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
        current_location: row.get(3)?,
        status: row.get(4)?,
        metadata: metadata_column(row, 5)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {raw}").into(),
        )
    })
}

fn metadata_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<serde_json::Value>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

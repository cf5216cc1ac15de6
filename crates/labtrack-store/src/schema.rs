//! Table definitions for the sample ledger.
//!
//! Three collections: `samples` keyed by `sample_id`, and the append-only
//! `movements` and `results` logs that reference it.

use rusqlite::Connection;
use tracing::debug;

/// Creates the three record collections and their indexes if absent.
///
/// Idempotent: safe to run against an already initialized database.
pub fn initialize(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS samples (
            sample_id TEXT PRIMARY KEY,
            sample_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            current_location TEXT NOT NULL,
            status TEXT NOT NULL
                CHECK (status IN ('registered', 'in_transit', 'analyzed')),
            metadata TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_samples_current_location
            ON samples(current_location);

        CREATE TABLE IF NOT EXISTS movements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sample_id TEXT NOT NULL REFERENCES samples(sample_id),
            timestamp TEXT NOT NULL,
            from_location TEXT NOT NULL,
            to_location TEXT NOT NULL,
            actor_id TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_movements_sample_timestamp
            ON movements(sample_id, timestamp, id);

        CREATE TABLE IF NOT EXISTS results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sample_id TEXT NOT NULL REFERENCES samples(sample_id),
            timestamp TEXT NOT NULL,
            assay_type TEXT NOT NULL,
            value REAL NOT NULL,
            units TEXT NOT NULL,
            instrument_id TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_results_sample_timestamp
            ON results(sample_id, timestamp, id);
        "#,
    )?;
    debug!("sample ledger schema ready");
    Ok(())
}

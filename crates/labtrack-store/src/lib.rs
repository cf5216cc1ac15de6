//! SQLite storage layer for the lab sample ledger.
//!
//! This crate provides:
//! - A pooled [`Store`] handle in WAL mode with all-or-nothing write transactions
//! - Table creation for samples, movements and results
//! - Model types for all three record kinds
//! - Query helpers that compose inside a transaction
//!
//! # Example
//!
//! ```ignore
//! let store = Store::open(path, PoolConfig::default())?;
//! store.run_transaction(|tx| -> StoreResult<()> {
//!     queries::insert_movement(tx, &id, &movement, now)?;
//!     queries::update_sample_location(tx, &id, &movement.to_location, SampleStatus::InTransit)?;
//!     Ok(())
//! })?;
//! ```
//!
//! The store knows nothing about lifecycle rules. Status transitions and
//! referential checks live in the engine that drives these helpers.

mod error;
mod models;
pub mod queries;
mod schema;
mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use schema::initialize;
pub use store::{PoolConfig, PoolState, Store};

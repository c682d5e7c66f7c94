//! Persistence interface for plan records.
//!
//! The generation core needs exactly two operations: append a record and
//! list one owner's records newest first. [`PgPlanStore`] backs them with
//! PostgreSQL; [`MemoryPlanStore`] keeps them in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use waypoint_db::models::{NewPlanRecord, PlanRecord};

pub use memory::MemoryPlanStore;
pub use postgres::PgPlanStore;

/// Errors reported by a [`PlanStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to write to {collection}: {message}")]
    WriteFailed {
        collection: &'static str,
        message: String,
    },

    #[error("failed to read from {collection}: {message}")]
    ReadFailed {
        collection: &'static str,
        message: String,
    },
}

/// Keyed record store for plan records.
///
/// Once `create_record` returns, the record must be visible to the next
/// `query_records` call for the same owner.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persist a record and return its store-assigned identifier.
    async fn create_record(&self, record: &NewPlanRecord) -> Result<Uuid, StoreError>;

    /// All records owned by `owner_id`, ordered by `created_at` descending.
    async fn query_records(&self, owner_id: &str) -> Result<Vec<PlanRecord>, StoreError>;
}

//! PostgreSQL-backed [`PlanStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use waypoint_db::models::{NewPlanRecord, PlanRecord};
use waypoint_db::queries::{PLAN_COLLECTION, plan_records};

use super::{PlanStore, StoreError};

/// Stores plan records in the `plan_records` table.
#[derive(Debug, Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn create_record(&self, record: &NewPlanRecord) -> Result<Uuid, StoreError> {
        plan_records::insert_plan_record(&self.pool, record)
            .await
            .map_err(|e| StoreError::WriteFailed {
                collection: PLAN_COLLECTION,
                message: format!("{e:#}"),
            })
    }

    async fn query_records(&self, owner_id: &str) -> Result<Vec<PlanRecord>, StoreError> {
        plan_records::list_plan_records_for_owner(&self.pool, owner_id)
            .await
            .map_err(|e| StoreError::ReadFailed {
                collection: PLAN_COLLECTION,
                message: format!("{e:#}"),
            })
    }
}

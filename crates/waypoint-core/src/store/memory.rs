//! In-process [`PlanStore`], used by tests and `serve --in-memory`.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use waypoint_db::models::{NewPlanRecord, PlanRecord};

use super::{PlanStore, StoreError};

/// Records kept in insertion order behind a read-write lock.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    records: RwLock<Vec<PlanRecord>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all owners.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn create_record(&self, record: &NewPlanRecord) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.records
            .write()
            .await
            .push(record.clone().into_record(id));
        Ok(id)
    }

    async fn query_records(&self, owner_id: &str) -> Result<Vec<PlanRecord>, StoreError> {
        let records = self.records.read().await;
        // Reverse first so equal timestamps come out newest-inserted first;
        // the sort is stable.
        let mut owned: Vec<PlanRecord> = records
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

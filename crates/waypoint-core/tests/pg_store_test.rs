//! `PlanService` backed by `PgPlanStore` against a real PostgreSQL database.

use std::sync::Arc;

use async_trait::async_trait;

use waypoint_core::{
    GeneratorConfig, ModelClient, ModelError, PgPlanStore, PlanService, PlanStore, StoreError,
};
use waypoint_db::models::{ExperienceTier, Profile};
use waypoint_db::pool;
use waypoint_test_utils::TestDb;

struct OfflineModel;

#[async_trait]
impl ModelClient for OfflineModel {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Unavailable("offline".to_string()))
    }
}

fn profile(region: &str) -> Profile {
    Profile {
        domain: "Robotics".to_string(),
        experience_tier: Some(ExperienceTier::Expert),
        region: region.to_string(),
        goals: "win the state championship".to_string(),
        display_name: None,
    }
}

#[tokio::test]
async fn generated_plans_are_persisted_and_listed() {
    let db = TestDb::create().await;
    let store = Arc::new(PgPlanStore::new(db.pool().clone()));
    let service = PlanService::new(Arc::new(OfflineModel), store, GeneratorConfig::default());

    let first = service
        .generate_plan(profile("Utah"), Some("owner-1"))
        .await
        .unwrap();
    let second = service
        .generate_plan(profile("Idaho"), Some("owner-1"))
        .await
        .unwrap();
    service
        .generate_plan(profile("Maine"), Some("owner-2"))
        .await
        .unwrap();

    let listed = service.list_plans(Some("owner-1")).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    // The returned records are exactly what a later read sees.
    assert_eq!(listed, vec![second.clone(), first.clone()]);
    assert_eq!(listed[0].source_profile, profile("Idaho"));
    assert!(listed[1].plan.overview.contains("Utah"));

    assert_eq!(pool::record_count(db.pool()).await.unwrap(), 3);

    db.cleanup().await;
}

#[tokio::test]
async fn closed_pool_reports_store_errors() {
    let db = TestDb::create().await;
    let store = PgPlanStore::new(db.pool().clone());
    db.pool().close().await;

    let err = store.query_records("owner-1").await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReadFailed {
            collection: "plan_records",
            ..
        }
    ));

    db.cleanup().await;
}

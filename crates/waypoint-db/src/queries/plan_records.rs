//! Database query functions for the `plan_records` table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{NewPlanRecord, Plan, PlanRecord, Profile};

/// Name of the collection (table) holding plan records.
pub const PLAN_COLLECTION: &str = "plan_records";

/// Row shape of `plan_records`; profile and plan are JSONB documents.
#[derive(Debug, sqlx::FromRow)]
struct PlanRecordRow {
    id: Uuid,
    owner_id: String,
    created_at: DateTime<Utc>,
    source_profile: Json<Profile>,
    plan: Json<Plan>,
}

impl From<PlanRecordRow> for PlanRecord {
    fn from(row: PlanRecordRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            created_at: row.created_at,
            source_profile: row.source_profile.0,
            plan: row.plan.0,
        }
    }
}

/// Insert a plan record. Returns the server-generated ID.
///
/// `created_at` is taken from the record, not from the server clock, so the
/// timestamp reflects when the record was built.
pub async fn insert_plan_record(pool: &PgPool, record: &NewPlanRecord) -> Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO plan_records (owner_id, created_at, source_profile, plan) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(&record.owner_id)
    .bind(record.created_at)
    .bind(Json(&record.source_profile))
    .bind(Json(&record.plan))
    .fetch_one(pool)
    .await
    .context("failed to insert plan record")?;

    Ok(id)
}

/// List an owner's plan records, newest first.
///
/// Records sharing a `created_at` come back most recently inserted first.
pub async fn list_plan_records_for_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<PlanRecord>> {
    let rows = sqlx::query_as::<_, PlanRecordRow>(
        "SELECT id, owner_id, created_at, source_profile, plan \
         FROM plan_records \
         WHERE owner_id = $1 \
         ORDER BY created_at DESC, seq DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to list plan records for owner {owner_id:?}"))?;

    Ok(rows.into_iter().map(PlanRecord::from).collect())
}

/// Fetch a plan record by its ID.
pub async fn get_plan_record(pool: &PgPool, id: Uuid) -> Result<Option<PlanRecord>> {
    let row = sqlx::query_as::<_, PlanRecordRow>(
        "SELECT id, owner_id, created_at, source_profile, plan \
         FROM plan_records WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch plan record")?;

    Ok(row.map(PlanRecord::from))
}

/// Delete a plan record owned by `owner_id`.
///
/// Returns `false` when no matching record exists.
pub async fn delete_plan_record(pool: &PgPool, id: Uuid, owner_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plan_records WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await
        .context("failed to delete plan record")?;

    Ok(result.rows_affected() > 0)
}

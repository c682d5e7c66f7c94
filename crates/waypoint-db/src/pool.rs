//! Pool construction and schema bootstrap for the plan store.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool};
use tracing::info;

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/waypoint-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

fn connect_options(config: &DbConfig) -> Result<PgConnectOptions> {
    PgConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("invalid database URL {:?}", config.database_url))
}

/// Open a pool against the configured database. The schema is not touched.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(connect_options(config)?)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.database_url))
}

/// Apply pending embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;
    info!("plan_records schema is current");
    Ok(())
}

/// Make the configured database usable: create it when the server does not
/// have it yet, then migrate. Safe to repeat.
pub async fn bootstrap(config: &DbConfig) -> Result<PgPool> {
    let options = connect_options(config)?;
    let Some(name) = options.get_database() else {
        bail!("database URL {:?} names no database", config.database_url);
    };
    create_database_if_missing(&options, name).await?;

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn create_database_if_missing(options: &PgConnectOptions, name: &str) -> Result<()> {
    // CREATE DATABASE takes no bind parameters.
    if !is_plain_identifier(name) {
        bail!("database name {name:?} must be lowercase letters, digits and underscores");
    }

    let mut conn = PgConnection::connect_with(&options.clone().database("postgres"))
        .await
        .context("failed to connect to the postgres maintenance database")?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&mut conn)
            .await
            .context("failed to query pg_database")?;

    if !exists {
        let stmt = format!("CREATE DATABASE {name}");
        sqlx::raw_sql(&stmt)
            .execute(&mut conn)
            .await
            .with_context(|| format!("failed to create database {name}"))?;
        info!(db = name, "database created");
    }

    conn.close().await.context("failed to close maintenance connection")
}

fn is_plain_identifier(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Number of stored plan records, for the `db-init` summary.
pub async fn record_count(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM plan_records")
        .fetch_one(pool)
        .await
        .context("failed to count plan records")?;
    Ok(count)
}

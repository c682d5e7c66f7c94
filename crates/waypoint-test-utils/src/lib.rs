//! Shared test utilities for waypoint integration tests.
//!
//! Provides a PostgreSQL server shared by every test in a binary. Each test
//! gets its own freshly migrated database on that server through [`TestDb`].
//!
//! Two modes:
//! - **`WAYPOINT_TEST_PG_URL`** set: use that server directly (CI service
//!   container, local Postgres). The URL must not name a database.
//! - **No env var**: start a container via testcontainers, shared per test
//!   binary through a `OnceCell`.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use waypoint_db::pool;

struct SharedServer {
    base_url: String,
    /// Keeps the container alive. `None` when using an external URL.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_SERVER: OnceCell<SharedServer> = OnceCell::const_new();

async fn start_server() -> SharedServer {
    if let Ok(url) = std::env::var("WAYPOINT_TEST_PG_URL") {
        return SharedServer {
            base_url: url.trim_end_matches('/').to_string(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedServer {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server root URL (no database name), starting the server on first use.
pub async fn server_url() -> &'static str {
    &SHARED_SERVER.get_or_init(start_server).await.base_url
}

async fn maintenance_pool() -> PgPool {
    let url = format!("{}/postgres", server_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .expect("failed to connect to maintenance database")
}

/// A uniquely named, migrated database that lives for one test.
pub struct TestDb {
    pool: PgPool,
    name: String,
}

impl TestDb {
    /// Create the database and apply all embedded migrations.
    pub async fn create() -> Self {
        let name = format!("waypoint_test_{}", Uuid::new_v4().simple());

        let maint = maintenance_pool().await;
        maint
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create test database {name}: {e}"));
        maint.close().await;

        let url = format!("{}/{name}", server_url().await);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await
            .unwrap_or_else(|e| panic!("failed to connect to test database {name}: {e}"));

        pool::run_migrations(&pool)
            .await
            .expect("migrations should succeed");

        Self { pool, name }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the pool and drop the database.
    ///
    /// Safe to call even if the database is already gone.
    pub async fn cleanup(self) {
        self.pool.close().await;

        let maint = maintenance_pool().await;
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) \
             FROM pg_stat_activity \
             WHERE datname = '{}' AND pid <> pg_backend_pid()",
            self.name
        );
        let _ = maint.execute(terminate.as_str()).await;
        let _ = maint
            .execute(format!("DROP DATABASE IF EXISTS {}", self.name).as_str())
            .await;
        maint.close().await;
    }
}

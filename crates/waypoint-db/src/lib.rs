//! Persistence layer for waypoint: domain models, connection pool,
//! embedded migrations, and `plan_records` queries.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;

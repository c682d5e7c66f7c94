//! Query functions, one module per table.

pub mod plan_records;

pub use plan_records::PLAN_COLLECTION;

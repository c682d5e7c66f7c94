//! Plan-generation core for waypoint.
//!
//! Turns a requester [`Profile`](waypoint_db::models::Profile) into a
//! persisted [`PlanRecord`](waypoint_db::models::PlanRecord): validate the
//! profile, prompt the model, extract and validate its JSON, fall back to a
//! synthesized plan on any model-side failure, and record the result.

pub mod model;
pub mod plan;
pub mod profile;
pub mod service;
pub mod store;

pub use model::{GeminiClient, GeminiConfig, ModelClient, ModelError};
pub use profile::{IncompleteProfile, ValidProfile, validate_profile};
pub use service::{GenerateError, GenerationStage, GeneratorConfig, PlanService};
pub use store::{MemoryPlanStore, PgPlanStore, PlanStore, StoreError};

//! The plan-generation stages: prompt, extraction, validation, fallback
//! synthesis, and record construction. All pure; no I/O.

pub mod extract;
pub mod fallback;
pub mod prompt;
pub mod record;
pub mod validate;

pub use extract::{ExtractError, extract_json};
pub use fallback::synthesize_plan;
pub use prompt::build_prompt;
pub use record::build_record;
pub use validate::{InvalidPlanShape, ShapeProblem, validate_plan};

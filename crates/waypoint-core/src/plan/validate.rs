//! Strict shape check for model-produced plans.
//!
//! A plan is accepted as a unit or not at all. Every required field is
//! checked for presence, type and non-emptiness; on success all strings are
//! trimmed and arrays keep their original order. Unknown keys are ignored.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use waypoint_db::models::{Plan, PlanPhase};

/// What was wrong with the field at [`InvalidPlanShape::path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeProblem {
    Missing,
    WrongType { expected: &'static str },
    Empty,
}

impl fmt::Display for ShapeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::Empty => f.write_str("empty"),
        }
    }
}

/// The parsed value is not a complete plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid plan shape at `{path}`: {problem}")]
pub struct InvalidPlanShape {
    /// Location of the offending field, e.g. `steps[1].actions[0]`.
    pub path: String,
    pub problem: ShapeProblem,
}

impl InvalidPlanShape {
    fn new(path: impl Into<String>, problem: ShapeProblem) -> Self {
        Self {
            path: path.into(),
            problem,
        }
    }
}

type ShapeResult<T> = Result<T, InvalidPlanShape>;

/// Validate and normalize a parsed JSON value into a [`Plan`].
pub fn validate_plan(value: &Value) -> ShapeResult<Plan> {
    let root = value.as_object().ok_or_else(|| {
        InvalidPlanShape::new("plan", ShapeProblem::WrongType { expected: "object" })
    })?;

    let title = required_string(root, "title", "title")?;
    let overview = required_string(root, "overview", "overview")?;

    let phases = required_array(root, "steps", "steps")?
        .iter()
        .enumerate()
        .map(|(i, step)| validate_phase(step, &format!("steps[{i}]")))
        .collect::<ShapeResult<Vec<_>>>()?;

    let quick_wins = required_string_array(root, "quickWins", "quickWins")?;
    let long_term_goals = required_string_array(root, "longTermGoals", "longTermGoals")?;

    Ok(Plan {
        title,
        overview,
        phases,
        quick_wins,
        long_term_goals,
    })
}

fn validate_phase(value: &Value, path: &str) -> ShapeResult<PlanPhase> {
    let obj = value.as_object().ok_or_else(|| {
        InvalidPlanShape::new(path, ShapeProblem::WrongType { expected: "object" })
    })?;

    Ok(PlanPhase {
        phase_label: required_string(obj, "phase", &format!("{path}.phase"))?,
        title: required_string(obj, "title", &format!("{path}.title"))?,
        description: required_string(obj, "description", &format!("{path}.description"))?,
        timeline: required_string(obj, "timeline", &format!("{path}.timeline"))?,
        actions: required_string_array(obj, "actions", &format!("{path}.actions"))?,
    })
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> ShapeResult<&'a Value> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(InvalidPlanShape::new(path, ShapeProblem::Missing)),
        Some(value) => Ok(value),
    }
}

fn non_empty_string(value: &Value, path: &str) -> ShapeResult<String> {
    let s = value.as_str().ok_or_else(|| {
        InvalidPlanShape::new(path, ShapeProblem::WrongType { expected: "string" })
    })?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(InvalidPlanShape::new(path, ShapeProblem::Empty));
    }
    Ok(trimmed.to_string())
}

fn required_string(obj: &Map<String, Value>, key: &str, path: &str) -> ShapeResult<String> {
    non_empty_string(required(obj, key, path)?, path)
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> ShapeResult<&'a Vec<Value>> {
    let items = required(obj, key, path)?.as_array().ok_or_else(|| {
        InvalidPlanShape::new(path, ShapeProblem::WrongType { expected: "array" })
    })?;
    if items.is_empty() {
        return Err(InvalidPlanShape::new(path, ShapeProblem::Empty));
    }
    Ok(items)
}

fn required_string_array(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> ShapeResult<Vec<String>> {
    required_array(obj, key, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| non_empty_string(item, &format!("{path}[{i}]")))
        .collect()
}

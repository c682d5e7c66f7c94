//! Plan generation orchestrator.
//!
//! Runs the pipeline for one request:
//!
//! ```text
//! Validating -> Prompting -> Invoking -> Extracting -> ValidatingPlan
//!     |                          \            |            /
//!     | IncompleteProfile         `--- any failure ------'
//!     v                                       |
//!   (error)                              Synthesizing
//!                                             |
//!        ValidatingPlan ok ---------------> Recording -> PlanRecord
//! ```
//!
//! Only profile/auth problems and store failures reach the caller. Model,
//! extraction and shape failures are logged and replaced by a synthesized
//! plan, so a valid request always yields a complete record.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use waypoint_db::models::{Plan, PlanRecord, Profile};

use crate::model::{ModelClient, ModelError};
use crate::plan::{
    ExtractError, InvalidPlanShape, build_prompt, build_record, extract_json, synthesize_plan,
    validate_plan,
};
use crate::profile::{IncompleteProfile, ValidProfile, validate_profile};
use crate::store::{PlanStore, StoreError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Upper bound on the model call. Elapsing counts as `ModelTimeout`.
    pub model_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(45),
        }
    }
}

/// Pipeline stage, used for logging and for attributing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Validating,
    Prompting,
    Invoking,
    Extracting,
    ValidatingPlan,
    Synthesizing,
    Recording,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::Prompting => "prompting",
            Self::Invoking => "invoking",
            Self::Extracting => "extracting",
            Self::ValidatingPlan => "validating_plan",
            Self::Synthesizing => "synthesizing",
            Self::Recording => "recording",
        };
        f.write_str(s)
    }
}

/// Why the model path did not produce a plan. Never surfaced to callers of
/// [`PlanService::generate_plan`].
#[derive(Debug, Error)]
pub enum PlanAttemptError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Shape(#[from] InvalidPlanShape),
}

impl PlanAttemptError {
    /// The stage that failed.
    pub fn stage(&self) -> GenerationStage {
        match self {
            Self::Model(_) => GenerationStage::Invoking,
            Self::Extract(_) => GenerationStage::Extracting,
            Self::Shape(_) => GenerationStage::ValidatingPlan,
        }
    }
}

/// Errors visible to callers of [`PlanService`].
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    IncompleteProfile(#[from] IncompleteProfile),

    #[error("no authenticated user")]
    Unauthenticated,

    #[error("plan could not be saved: {0}")]
    StoreWriteFailed(#[source] StoreError),

    #[error("plans could not be loaded: {0}")]
    StoreReadFailed(#[source] StoreError),
}

/// Which path produced a recorded plan. Logged only; records do not carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Model,
    Fallback,
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        })
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Entry point for generating and listing plans.
///
/// Holds no per-request state, so one instance can serve concurrent
/// requests behind an `Arc`.
#[derive(Clone)]
pub struct PlanService {
    model: Arc<dyn ModelClient>,
    store: Arc<dyn PlanStore>,
    config: GeneratorConfig,
}

impl PlanService {
    pub fn new(
        model: Arc<dyn ModelClient>,
        store: Arc<dyn PlanStore>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            model,
            store,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate, persist and return a plan for `profile`, owned by `owner_id`.
    pub async fn generate_plan(
        &self,
        profile: Profile,
        owner_id: Option<&str>,
    ) -> Result<PlanRecord, GenerateError> {
        self.generate_plan_with_cancel(profile, owner_id, &CancellationToken::new())
            .await
    }

    /// Like [`generate_plan`](Self::generate_plan), but the model call is
    /// abandoned when `cancel` fires. A cancelled call is treated as an
    /// unavailable model and the plan is synthesized.
    pub async fn generate_plan_with_cancel(
        &self,
        profile: Profile,
        owner_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<PlanRecord, GenerateError> {
        let owner_id = authenticated_owner(owner_id)?;

        debug!(owner_id, stage = %GenerationStage::Validating, "generating plan");
        let profile = validate_profile(profile)?;

        let (plan, source) = match request_model_plan(
            self.model.as_ref(),
            &profile,
            self.config.model_timeout,
            cancel,
        )
        .await
        {
            Ok(plan) => (plan, PlanSource::Model),
            Err(err) => {
                warn!(
                    owner_id,
                    model = self.model.name(),
                    stage = %err.stage(),
                    error = %err,
                    "model plan unavailable, synthesizing fallback plan"
                );
                debug!(owner_id, stage = %GenerationStage::Synthesizing);
                (synthesize_plan(&profile), PlanSource::Fallback)
            }
        };

        debug!(owner_id, stage = %GenerationStage::Recording);
        let new_record = build_record(plan, owner_id, profile.into_profile());
        let id = self
            .store
            .create_record(&new_record)
            .await
            .map_err(GenerateError::StoreWriteFailed)?;

        info!(
            owner_id,
            record_id = %id,
            source = %source,
            phases = new_record.plan.phases.len(),
            "plan recorded"
        );
        Ok(new_record.into_record(id))
    }

    /// The owner's plan records, newest first.
    pub async fn list_plans(&self, owner_id: Option<&str>) -> Result<Vec<PlanRecord>, GenerateError> {
        let owner_id = authenticated_owner(owner_id)?;
        self.store
            .query_records(owner_id)
            .await
            .map_err(GenerateError::StoreReadFailed)
    }
}

fn authenticated_owner(owner_id: Option<&str>) -> Result<&str, GenerateError> {
    owner_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(GenerateError::Unauthenticated)
}

// ---------------------------------------------------------------------------
// Model path
// ---------------------------------------------------------------------------

/// Prompt, invoke, extract and validate: the model path without fallback.
pub async fn request_model_plan(
    model: &dyn ModelClient,
    profile: &ValidProfile,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Plan, PlanAttemptError> {
    debug!(stage = %GenerationStage::Prompting, domain = %profile.domain);
    let prompt = build_prompt(profile);

    debug!(stage = %GenerationStage::Invoking, model = model.name(), prompt_chars = prompt.len());
    let raw = invoke_model(model, &prompt, timeout, cancel).await?;

    debug!(stage = %GenerationStage::Extracting, response_chars = raw.len());
    let value = extract_json(&raw)?;

    debug!(stage = %GenerationStage::ValidatingPlan);
    Ok(validate_plan(&value)?)
}

async fn invoke_model(
    model: &dyn ModelClient,
    prompt: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<String, ModelError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ModelError::Unavailable("request cancelled".to_string())),
        result = tokio::time::timeout(timeout, model.generate(prompt)) => {
            result.unwrap_or_else(|_| Err(ModelError::Timeout { after: timeout }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use waypoint_db::models::ExperienceTier;

    struct FixedModel(&'static str);

    #[async_trait]
    impl ModelClient for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            Ok(self.0.to_string())
        }
    }

    struct StalledModel;

    #[async_trait]
    impl ModelClient for StalledModel {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            std::future::pending().await
        }
    }

    fn profile() -> ValidProfile {
        validate_profile(Profile {
            domain: "Chess".to_string(),
            experience_tier: Some(ExperienceTier::Advanced),
            region: "Texas".to_string(),
            goals: "reach 2000 rating".to_string(),
            display_name: None,
        })
        .unwrap()
    }

    #[test]
    fn stage_display() {
        assert_eq!(GenerationStage::ValidatingPlan.to_string(), "validating_plan");
        assert_eq!(GenerationStage::Synthesizing.to_string(), "synthesizing");
        assert_eq!(PlanSource::Fallback.to_string(), "fallback");
    }

    #[test]
    fn owner_must_be_present_and_non_blank() {
        assert!(matches!(
            authenticated_owner(None),
            Err(GenerateError::Unauthenticated)
        ));
        assert!(matches!(
            authenticated_owner(Some("  ")),
            Err(GenerateError::Unauthenticated)
        ));
        assert_eq!(authenticated_owner(Some(" u1 ")).unwrap(), "u1");
    }

    #[tokio::test]
    async fn attempt_error_stage_for_no_json() {
        let err = request_model_plan(
            &FixedModel("no json here"),
            &profile(),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PlanAttemptError::Extract(ExtractError::NoJsonFound)));
        assert_eq!(err.stage(), GenerationStage::Extracting);
    }

    #[tokio::test]
    async fn attempt_error_stage_for_bad_shape() {
        let err = request_model_plan(
            &FixedModel(r#"{"title": "only a title"}"#),
            &profile(),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.stage(), GenerationStage::ValidatingPlan);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_model_times_out() {
        let err = request_model_plan(
            &StalledModel,
            &profile(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            PlanAttemptError::Model(ModelError::Timeout { after }) if after == Duration::from_secs(5)
        ));
        assert_eq!(err.stage(), GenerationStage::Invoking);
    }

    #[tokio::test]
    async fn cancelled_call_is_unavailable() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = request_model_plan(&StalledModel, &profile(), Duration::from_secs(60), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanAttemptError::Model(ModelError::Unavailable(_))));
    }
}

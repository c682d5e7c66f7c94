use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Experience tier of the requester, from least to most experienced.
///
/// Serialized as the capitalized variant name; parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ExperienceTier {
    Novice,
    Intermediate,
    Advanced,
    Expert,
}

impl ExperienceTier {
    /// Every tier, in ascending order.
    pub const ALL: [ExperienceTier; 4] = [
        Self::Novice,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Novice => "Novice",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        }
    }
}

impl fmt::Display for ExperienceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceTier {
    type Err = ExperienceTierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "novice" => Ok(Self::Novice),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            _ => Err(ExperienceTierParseError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for ExperienceTier {
    type Error = ExperienceTierParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error returned when parsing an invalid [`ExperienceTier`] string.
#[derive(Debug, Clone)]
pub struct ExperienceTierParseError(pub String);

impl fmt::Display for ExperienceTierParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid experience tier: {:?} (expected Novice, Intermediate, Advanced, or Expert)",
            self.0
        )
    }
}

impl std::error::Error for ExperienceTierParseError {}

/// A blank tier (an unselected form field) reads as `None`, so completeness
/// is reported by profile validation. Unknown words are still rejected.
fn deserialize_optional_tier<'de, D>(deserializer: D) -> Result<Option<ExperienceTier>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The requester's profile, as collected by the caller.
///
/// Nothing here is guaranteed to be filled in; completeness is checked once
/// by the profile validator in `waypoint-core`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub domain: String,
    #[serde(default, deserialize_with = "deserialize_optional_tier")]
    pub experience_tier: Option<ExperienceTier>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One phase of a plan. Phases execute in the order they appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPhase {
    /// Short label such as "Phase 1".
    #[serde(rename = "phase")]
    pub phase_label: String,
    pub title: String,
    pub description: String,
    /// Free-form timeline, e.g. "Months 1-2".
    pub timeline: String,
    pub actions: Vec<String>,
}

/// A complete multi-phase action plan.
///
/// The serialized form is the same JSON shape the model is asked to emit,
/// with phases under `steps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub title: String,
    pub overview: String,
    #[serde(rename = "steps")]
    pub phases: Vec<PlanPhase>,
    pub quick_wins: Vec<String>,
    pub long_term_goals: Vec<String>,
}

// ---------------------------------------------------------------------------
// Plan records
// ---------------------------------------------------------------------------

/// A plan record that has been built but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlanRecord {
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub source_profile: Profile,
    pub plan: Plan,
}

impl NewPlanRecord {
    /// Attach the store-assigned identifier.
    pub fn into_record(self, id: Uuid) -> PlanRecord {
        PlanRecord {
            id,
            owner_id: self.owner_id,
            created_at: self.created_at,
            source_profile: self.source_profile,
            plan: self.plan,
        }
    }
}

/// A persisted plan with ownership and creation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub source_profile: Profile,
    #[serde(flatten)]
    pub plan: Plan,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> Plan {
        Plan {
            title: "Blueprint".to_string(),
            overview: "Overview".to_string(),
            phases: vec![PlanPhase {
                phase_label: "Phase 1".to_string(),
                title: "Foundation".to_string(),
                description: "Lay groundwork".to_string(),
                timeline: "Months 1-2".to_string(),
                actions: vec!["Do a".to_string(), "Do b".to_string()],
            }],
            quick_wins: vec!["Win".to_string()],
            long_term_goals: vec!["Goal".to_string()],
        }
    }

    #[test]
    fn experience_tier_display_and_parse() {
        for tier in ExperienceTier::ALL {
            assert_eq!(tier.to_string().parse::<ExperienceTier>().unwrap(), tier);
        }
        assert_eq!(
            "  novice ".parse::<ExperienceTier>().unwrap(),
            ExperienceTier::Novice
        );
        assert_eq!(
            "EXPERT".parse::<ExperienceTier>().unwrap(),
            ExperienceTier::Expert
        );
    }

    #[test]
    fn experience_tier_rejects_unknown() {
        let err = "wizard".parse::<ExperienceTier>().unwrap_err();
        assert!(err.to_string().contains("wizard"));
    }

    #[test]
    fn experience_tier_is_ordered() {
        assert!(ExperienceTier::Novice < ExperienceTier::Intermediate);
        assert!(ExperienceTier::Advanced < ExperienceTier::Expert);
        let mut sorted = ExperienceTier::ALL;
        sorted.sort();
        assert_eq!(sorted, ExperienceTier::ALL);
    }

    #[test]
    fn profile_deserializes_camel_case() {
        let json = r#"{"domain":"Debate","experienceTier":"novice","region":"Oregon","goals":"win","displayName":"Sam"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.domain, "Debate");
        assert_eq!(profile.experience_tier, Some(ExperienceTier::Novice));
        assert_eq!(profile.display_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn profile_tolerates_missing_fields() {
        let profile: Profile = serde_json::from_str(r#"{"domain":"Chess"}"#).unwrap();
        assert_eq!(profile.domain, "Chess");
        assert!(profile.experience_tier.is_none());
        assert!(profile.goals.is_empty());
    }

    #[test]
    fn profile_rejects_unknown_tier() {
        let result: Result<Profile, _> =
            serde_json::from_str(r#"{"domain":"Chess","experienceTier":"Wizard"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn profile_blank_tier_is_unset() {
        for tier in [r#""""#, r#""   ""#, "null"] {
            let json = format!(r#"{{"domain":"Chess","experienceTier":{tier}}}"#);
            let profile: Profile = serde_json::from_str(&json).unwrap();
            assert!(profile.experience_tier.is_none(), "tier {tier}");
        }
    }

    #[test]
    fn plan_serializes_model_schema_keys() {
        let value = serde_json::to_value(sample_plan()).unwrap();
        assert!(value.get("steps").is_some());
        assert!(value.get("quickWins").is_some());
        assert!(value.get("longTermGoals").is_some());
        assert_eq!(value["steps"][0]["phase"], "Phase 1");
    }

    #[test]
    fn plan_record_flattens_plan() {
        let record = NewPlanRecord {
            owner_id: "user-1".to_string(),
            created_at: Utc::now(),
            source_profile: Profile::default(),
            plan: sample_plan(),
        }
        .into_record(Uuid::nil());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["ownerId"], "user-1");
        assert_eq!(value["title"], "Blueprint");
        assert!(value.get("sourceProfile").is_some());
        assert!(value.get("plan").is_none());
    }
}

//! Profile completeness check.
//!
//! A [`ValidProfile`] can only be obtained through [`validate_profile`], so
//! every later stage (prompting, fallback synthesis, recording) can rely on
//! the required fields being present without checking again.

use std::ops::Deref;

use thiserror::Error;

use waypoint_db::models::{ExperienceTier, Profile};

/// The profile lacks one or more required fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("profile is incomplete: missing {}", .missing.join(", "))]
pub struct IncompleteProfile {
    /// Names of the missing fields, in declaration order.
    pub missing: Vec<&'static str>,
}

/// A profile whose required fields are all present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    profile: Profile,
    tier: ExperienceTier,
}

impl ValidProfile {
    pub fn tier(&self) -> ExperienceTier {
        self.tier
    }

    /// The profile exactly as it was submitted.
    pub fn as_profile(&self) -> &Profile {
        &self.profile
    }

    pub fn into_profile(self) -> Profile {
        self.profile
    }
}

impl Deref for ValidProfile {
    type Target = Profile;

    fn deref(&self) -> &Profile {
        &self.profile
    }
}

/// Check that `domain`, `experienceTier`, `region` and `goals` are present.
///
/// Text fields count as missing when they are empty after trimming. The
/// profile itself is returned unchanged.
pub fn validate_profile(profile: Profile) -> Result<ValidProfile, IncompleteProfile> {
    let mut missing = Vec::new();

    if profile.domain.trim().is_empty() {
        missing.push("domain");
    }
    if profile.experience_tier.is_none() {
        missing.push("experienceTier");
    }
    if profile.region.trim().is_empty() {
        missing.push("region");
    }
    if profile.goals.trim().is_empty() {
        missing.push("goals");
    }

    match profile.experience_tier {
        Some(tier) if missing.is_empty() => Ok(ValidProfile { profile, tier }),
        _ => Err(IncompleteProfile { missing }),
    }
}

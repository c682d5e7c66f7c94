//! Prompt construction for plan generation.
//!
//! The prompt is a pure function of the profile: no timestamps, no
//! randomness. It embeds a literal example of the JSON the model must return
//! so that extraction works without a structured-output mode.

use std::ops::RangeInclusive;

use crate::profile::ValidProfile;

/// Number of phases the model is asked for.
pub const PHASE_RANGE: RangeInclusive<usize> = 4..=5;
/// Number of action items requested per phase.
pub const ACTION_RANGE: RangeInclusive<usize> = 3..=5;
/// Number of quick wins requested.
pub const QUICK_WIN_RANGE: RangeInclusive<usize> = 3..=5;
/// Number of long-term goals requested.
pub const LONG_TERM_GOAL_RANGE: RangeInclusive<usize> = 3..=5;

/// Literal example of the expected response shape.
pub const SCHEMA_EXAMPLE: &str = r#"{
  "title": "Your Success Blueprint",
  "overview": "Executive summary of the opportunity and strategy",
  "steps": [
    {
      "phase": "Phase 1",
      "title": "Foundation Building",
      "description": "Detailed description of this phase",
      "timeline": "Months 1-2",
      "actions": ["Action 1", "Action 2", "Action 3"]
    }
  ],
  "quickWins": ["Quick win 1", "Quick win 2", "Quick win 3"],
  "longTermGoals": ["Long-term goal 1", "Long-term goal 2", "Long-term goal 3"]
}"#;

fn range_text(range: &RangeInclusive<usize>) -> String {
    format!("{}-{}", range.start(), range.end())
}

/// Render the generation prompt for a profile.
pub fn build_prompt(profile: &ValidProfile) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(&format!(
        "You are an expert advisor in {domain}. Generate a comprehensive, personalized \
         action plan for the following person:\n\n",
        domain = profile.domain,
    ));

    if let Some(name) = profile.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("Name: {name}\n"));
    }
    prompt.push_str(&format!("Domain: {}\n", profile.domain));
    prompt.push_str(&format!("Experience Tier: {}\n", profile.tier()));
    prompt.push_str(&format!("Region: {}\n", profile.region));
    prompt.push_str(&format!("Goals: {}\n\n", profile.goals));

    prompt.push_str("Create a detailed action plan that includes:\n\n");
    prompt.push_str("1. A compelling title for their journey\n");
    prompt.push_str("2. An executive overview of their potential and strategy\n");
    prompt.push_str(&format!(
        "3. {} specific phases of development, each with:\n",
        range_text(&PHASE_RANGE)
    ));
    prompt.push_str("   - Phase name\n");
    prompt.push_str("   - Clear title\n");
    prompt.push_str("   - Detailed description\n");
    prompt.push_str("   - Timeline (e.g. \"Months 1-2\")\n");
    prompt.push_str(&format!(
        "   - {} specific action items\n",
        range_text(&ACTION_RANGE)
    ));
    prompt.push_str(&format!(
        "4. {} quick wins they can implement immediately\n",
        range_text(&QUICK_WIN_RANGE)
    ));
    prompt.push_str(&format!(
        "5. {} long-term strategic goals\n\n",
        range_text(&LONG_TERM_GOAL_RANGE)
    ));

    prompt.push_str(
        "Make it specific to their domain, experience tier, region, and goals. Focus on \
         realistic, actionable strategies, and consider regional rules and opportunities.\n\n",
    );

    prompt.push_str("Return the response in this exact JSON format:\n");
    prompt.push_str(SCHEMA_EXAMPLE);
    prompt.push('\n');

    prompt
}

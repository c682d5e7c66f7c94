//! Deterministic plan synthesis used whenever the model path fails.
//!
//! Every string is a template over the profile's domain, experience tier and
//! region. The free-text goals only ever appear in the overview.

use waypoint_db::models::{ExperienceTier, Plan, PlanPhase};

use crate::profile::ValidProfile;

pub const FALLBACK_PHASE_COUNT: usize = 4;
pub const FALLBACK_QUICK_WIN_COUNT: usize = 5;
pub const FALLBACK_LONG_TERM_GOAL_COUNT: usize = 5;

/// Build a complete plan from the profile alone. Never fails.
pub fn synthesize_plan(profile: &ValidProfile) -> Plan {
    let domain = profile.domain.trim();
    let region = profile.region.trim();
    let tier = profile.tier();
    let a_tier = with_article(tier);
    let goals = profile.goals.trim().trim_end_matches('.');

    let phases = vec![
        phase(
            1,
            "Foundation Building",
            format!("Establish your presence and personal foundation in the {domain} community."),
            "Months 1-2",
            [
                format!("Set up a professional profile that highlights your {domain} experience"),
                "Define a consistent personal brand: voice, visuals and values".to_string(),
                format!("Assemble the basic tools and resources {a_tier} in {domain} needs"),
                format!("Research and follow people who have succeeded in {domain}"),
                "Create a weekly schedule for practice and updates".to_string(),
            ],
        ),
        phase(
            2,
            "Skill Building & Engagement",
            "Grow visible skill and an engaged network through consistent effort.".to_string(),
            "Months 3-6",
            [
                format!("Share progress in {domain} three to four times per week"),
                "Document behind-the-scenes moments from events and practice".to_string(),
                format!("Engage with the {domain} community in {region}"),
                "Collaborate with peers at a similar level".to_string(),
                "Start a recurring series that tracks your journey".to_string(),
            ],
        ),
        phase(
            3,
            "Local Partnership Development",
            format!("Identify and pursue partnerships with organizations in {region}."),
            "Months 6-12",
            [
                format!("List organizations in {region} that align with your values"),
                "Prepare a one-page summary of your achievements and reach".to_string(),
                format!("Reach out to {domain} clubs, mentors and sponsors near you"),
                format!("Volunteer at {domain} events in {region}"),
                "Draft a reusable partnership proposal".to_string(),
            ],
        ),
        phase(
            4,
            "Expansion",
            "Scale your influence and pursue larger opportunities.".to_string(),
            "Year 2+",
            [
                format!("Apply for regional and national {domain} opportunities"),
                "Launch a project of your own that showcases your expertise".to_string(),
                "Start a podcast, newsletter or channel about your path".to_string(),
                format!("Mentor newcomers to {domain} in your community"),
                format!("Pursue speaking opportunities at events in {region}"),
            ],
        ),
    ];

    let quick_wins = vec![
        format!("Update every profile bio with your {domain} focus and contact details"),
        "Publish a professional headshot and an in-action photo".to_string(),
        "Share your schedule and upcoming events".to_string(),
        format!("Mention organizations in {region} you already support"),
        format!("Connect with coaches and recruiters active in {domain}"),
    ];

    let long_term_goals = vec![
        format!("Build a following of 10,000+ engaged people interested in {domain}"),
        format!("Secure 3-5 ongoing partnerships in {region}"),
        "Generate recurring income from your expertise".to_string(),
        format!("Become a recognized {domain} leader in {region}"),
        format!("Advance beyond the {tier} tier with a documented track record"),
    ];

    Plan {
        title: format!("{domain} Success Blueprint"),
        overview: format!(
            "A comprehensive action plan designed specifically for {a_tier} {domain} participant \
             in {region}. This plan focuses on building your personal brand, maximizing \
             opportunities, and achieving your goals: {goals}."
        ),
        phases,
        quick_wins,
        long_term_goals,
    }
}

/// "a Novice", "an Expert".
fn with_article(tier: ExperienceTier) -> String {
    let article = match tier {
        ExperienceTier::Novice => "a",
        ExperienceTier::Intermediate | ExperienceTier::Advanced | ExperienceTier::Expert => "an",
    };
    format!("{article} {tier}")
}

fn phase(
    number: usize,
    title: &str,
    description: String,
    timeline: &str,
    actions: [String; 5],
) -> PlanPhase {
    PlanPhase {
        phase_label: format!("Phase {number}"),
        title: title.to_string(),
        description,
        timeline: timeline.to_string(),
        actions: actions.into(),
    }
}

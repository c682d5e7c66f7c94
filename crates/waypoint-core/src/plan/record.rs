//! Plan record construction.

use chrono::{SubsecRound, Utc};

use waypoint_db::models::{NewPlanRecord, Plan, Profile};

/// Attach ownership, the source profile, and a creation timestamp to a plan.
///
/// The timestamp is taken now, at build time, immediately before the record
/// is handed to the store, and truncated to the microsecond precision that
/// `TIMESTAMPTZ` keeps. The store assigns the identifier.
pub fn build_record(plan: Plan, owner_id: &str, source_profile: Profile) -> NewPlanRecord {
    NewPlanRecord {
        owner_id: owner_id.to_string(),
        created_at: Utc::now().trunc_subsecs(6),
        source_profile,
        plan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_db::models::PlanPhase;

    fn plan() -> Plan {
        Plan {
            title: "T".to_string(),
            overview: "O".to_string(),
            phases: vec![PlanPhase {
                phase_label: "Phase 1".to_string(),
                title: "P".to_string(),
                description: "D".to_string(),
                timeline: "Now".to_string(),
                actions: vec!["A".to_string()],
            }],
            quick_wins: vec!["Q".to_string()],
            long_term_goals: vec!["L".to_string()],
        }
    }

    #[test]
    fn stamps_at_build_time() {
        let before = Utc::now().trunc_subsecs(6);
        let record = build_record(plan(), "user-7", Profile::default());
        let after = Utc::now();

        assert!(record.created_at >= before && record.created_at <= after);
        assert_eq!(record.owner_id, "user-7");
        assert_eq!(record.plan, plan());
    }

    #[test]
    fn timestamp_has_microsecond_precision() {
        for _ in 0..50 {
            let record = build_record(plan(), "u", Profile::default());
            assert_eq!(record.created_at.timestamp_subsec_nanos() % 1_000, 0);
        }
    }

    #[test]
    fn later_builds_do_not_sort_earlier() {
        let first = build_record(plan(), "u", Profile::default());
        let second = build_record(plan(), "u", Profile::default());
        assert!(second.created_at >= first.created_at);
    }
}

//! CLI handlers for the plan commands.
//!
//! Implements:
//! - `waypoint generate ...`            -- generate and record a plan
//! - `waypoint list --owner <id>`       -- list an owner's plans, newest first
//! - `waypoint show <record-id>`        -- print one plan record
//! - `waypoint delete <record-id> ...`  -- delete one of the owner's records

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use waypoint_core::{GeminiClient, GeneratorConfig, PgPlanStore, PlanService, PlanStore};
use waypoint_db::models::{PlanRecord, Profile};
use waypoint_db::queries::plan_records;

use crate::GenerateArgs;
use crate::config::WaypointConfig;

// -----------------------------------------------------------------------
// Service wiring
// -----------------------------------------------------------------------

/// Warn when generation will never reach the model. Returns whether it warned.
pub fn warn_if_model_disabled(config: &WaypointConfig) -> bool {
    let disabled = config.model_config.api_key.trim().is_empty();
    if disabled {
        tracing::warn!("no model API key configured; every plan will be synthesized");
    }
    disabled
}

/// Build a [`PlanService`] over `store` with the resolved Gemini settings.
pub fn build_service(config: &WaypointConfig, store: Arc<dyn PlanStore>) -> Result<PlanService> {
    let model = GeminiClient::new(config.model_config.clone())
        .context("failed to build model client")?;
    Ok(PlanService::new(
        Arc::new(model),
        store,
        GeneratorConfig::default(),
    ))
}

// -----------------------------------------------------------------------
// waypoint generate
// -----------------------------------------------------------------------

pub async fn cmd_generate(config: &WaypointConfig, pool: &PgPool, args: GenerateArgs) -> Result<()> {
    warn_if_model_disabled(config);
    let store = Arc::new(PgPlanStore::new(pool.clone()));
    let service = build_service(config, store)?;

    let profile = Profile {
        domain: args.domain,
        experience_tier: Some(args.tier),
        region: args.region,
        goals: args.goals,
        display_name: args.name,
    };

    // Ctrl-C abandons the model call; the plan is then synthesized.
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted; finishing with a synthesized plan.");
                cancel.cancel();
            }
        })
    };

    let result = service
        .generate_plan_with_cancel(profile, Some(args.owner.as_str()), &cancel)
        .await;
    watcher.abort();
    let record = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render_record(&record));
    }
    Ok(())
}

// -----------------------------------------------------------------------
// waypoint list
// -----------------------------------------------------------------------

pub async fn cmd_list(pool: &PgPool, owner: &str, json: bool) -> Result<()> {
    if owner.trim().is_empty() {
        bail!("--owner must not be blank");
    }
    let records = plan_records::list_plan_records_for_owner(pool, owner).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No plans found. Use `waypoint generate` to create one.");
        return Ok(());
    }
    print!("{}", render_table(&records));
    Ok(())
}

// -----------------------------------------------------------------------
// waypoint show <record-id>
// -----------------------------------------------------------------------

pub async fn cmd_show(pool: &PgPool, id_str: &str, json: bool) -> Result<()> {
    let id = parse_record_id(id_str)?;
    let record = plan_records::get_plan_record(pool, id)
        .await?
        .with_context(|| format!("plan record {id} not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render_record(&record));
    }
    Ok(())
}

// -----------------------------------------------------------------------
// waypoint delete <record-id>
// -----------------------------------------------------------------------

pub async fn cmd_delete(pool: &PgPool, id_str: &str, owner: &str) -> Result<()> {
    let id = parse_record_id(id_str)?;
    if !plan_records::delete_plan_record(pool, id, owner).await? {
        bail!("no plan record {id} owned by {owner}");
    }
    println!("Plan record {id} deleted.");
    Ok(())
}

fn parse_record_id(id_str: &str) -> Result<Uuid> {
    id_str
        .parse()
        .with_context(|| format!("invalid record ID: {id_str:?}"))
}

// -----------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------

/// Human-readable rendering of one record.
fn render_record(record: &PlanRecord) -> String {
    let plan = &record.plan;
    let profile = &record.source_profile;
    let mut out = String::new();

    let _ = writeln!(out, "{}", plan.title);
    let _ = writeln!(out, "  ID:       {}", record.id);
    let _ = writeln!(out, "  Owner:    {}", record.owner_id);
    let _ = writeln!(
        out,
        "  Created:  {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let tier = profile
        .experience_tier
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "  Profile:  {} / {} / {}",
        profile.domain, tier, profile.region
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", plan.overview);

    for phase in &plan.phases {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}: {} ({})",
            phase.phase_label, phase.title, phase.timeline
        );
        let _ = writeln!(out, "  {}", phase.description);
        for action in &phase.actions {
            let _ = writeln!(out, "  - {action}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Quick wins:");
    for win in &plan.quick_wins {
        let _ = writeln!(out, "  - {win}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Long-term goals:");
    for goal in &plan.long_term_goals {
        let _ = writeln!(out, "  - {goal}");
    }
    out
}

/// One row per record: id, creation time, phase count, title.
fn render_table(records: &[PlanRecord]) -> String {
    let id_w = 36;
    let created_w = 16;
    let phases_w = 6;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<id_w$}  {:<created_w$}  {:>phases_w$}  TITLE",
        "ID", "CREATED", "PHASES",
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:<id_w$}  {:<created_w$}  {:>phases_w$}  {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.plan.phases.len(),
            record.plan.title,
        );
    }
    out
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use waypoint_core::{GeminiConfig, MemoryPlanStore};
    use waypoint_db::config::DbConfig;
    use waypoint_db::models::{ExperienceTier, Plan, PlanPhase};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn with_captured_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    fn keyless_config() -> WaypointConfig {
        WaypointConfig {
            db_config: DbConfig::new(DbConfig::DEFAULT_URL),
            model_config: GeminiConfig::default(),
        }
    }

    fn record(title: &str, minute: u32) -> PlanRecord {
        PlanRecord {
            id: Uuid::new_v4(),
            owner_id: "owner-1".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 5, 4, 9, minute, 0).unwrap(),
            source_profile: Profile {
                domain: "Chess".to_string(),
                experience_tier: Some(ExperienceTier::Intermediate),
                region: "Vermont".to_string(),
                goals: "reach 1800".to_string(),
                display_name: None,
            },
            plan: Plan {
                title: title.to_string(),
                overview: "Climb steadily.".to_string(),
                phases: vec![PlanPhase {
                    phase_label: "Phase 1".to_string(),
                    title: "Openings".to_string(),
                    description: "Build a repertoire.".to_string(),
                    timeline: "Months 1-2".to_string(),
                    actions: vec!["Pick one defence".to_string()],
                }],
                quick_wins: vec!["Join a club".to_string()],
                long_term_goals: vec!["Earn a title".to_string()],
            },
        }
    }

    #[test]
    fn render_record_includes_every_section() {
        let rec = record("Chess Plan", 0);
        let out = render_record(&rec);

        assert!(out.starts_with("Chess Plan\n"));
        assert!(out.contains(&rec.id.to_string()));
        assert!(out.contains("Chess / Intermediate / Vermont"));
        assert!(out.contains("2026-05-04 09:00:00 UTC"));
        assert!(out.contains("Phase 1: Openings (Months 1-2)"));
        assert!(out.contains("  - Pick one defence"));
        assert!(out.contains("Quick wins:\n  - Join a club"));
        assert!(out.contains("Long-term goals:\n  - Earn a title"));
    }

    #[test]
    fn render_table_has_header_and_one_row_per_record() {
        let records = vec![record("Newer", 30), record("Older", 10)];
        let out = render_table(&records);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[0].ends_with("TITLE"));
        assert!(lines[1].contains("2026-05-04 09:30"));
        assert!(lines[1].ends_with("Newer"));
        assert!(lines[2].ends_with("Older"));
    }

    #[test]
    fn building_a_service_without_key_is_silent() {
        let logs = with_captured_logs(|| {
            build_service(&keyless_config(), Arc::new(MemoryPlanStore::new())).unwrap();
        });
        assert!(!logs.contains("no model API key"), "got: {logs}");
    }

    #[test]
    fn missing_key_warns_only_when_asked() {
        let logs = with_captured_logs(|| assert!(warn_if_model_disabled(&keyless_config())));
        assert!(logs.contains("no model API key configured"), "got: {logs}");

        let mut config = keyless_config();
        config.model_config.api_key = "secret".to_string();
        let logs = with_captured_logs(|| assert!(!warn_if_model_disabled(&config)));
        assert!(logs.is_empty(), "got: {logs}");
    }

    #[test]
    fn parse_record_id_rejects_garbage() {
        let err = parse_record_id("not-a-uuid").unwrap_err();
        assert!(err.to_string().contains("invalid record ID"));
        let id = Uuid::new_v4();
        assert_eq!(parse_record_id(&id.to_string()).unwrap(), id);
    }
}

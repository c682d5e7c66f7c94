mod config;
mod plan_cmds;
mod serve_cmd;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use waypoint_core::{MemoryPlanStore, PgPlanStore, PlanStore};
use waypoint_db::models::ExperienceTier;
use waypoint_db::pool;

use config::WaypointConfig;

#[derive(Parser)]
#[command(name = "waypoint", about = "Multi-phase action plans from a short profile")]
struct Cli {
    /// Database URL (overrides WAYPOINT_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a waypoint config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/waypoint")]
        db_url: String,
        /// Gemini API key (omit to always synthesize plans)
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the waypoint database (requires config file or env vars)
    DbInit,
    /// Generate a plan from a profile and record it
    Generate(GenerateArgs),
    /// List an owner's plans, newest first
    List {
        /// Owner whose plans to list
        #[arg(long)]
        owner: String,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one plan record
    Show {
        /// Record ID
        id: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one plan record
    Delete {
        /// Record ID
        id: String,
        /// Owner of the record
        #[arg(long)]
        owner: String,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
        /// Keep records in memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Owner of the generated record
    #[arg(long)]
    pub owner: String,
    /// Activity or field, e.g. "Debate"
    #[arg(long)]
    pub domain: String,
    /// Experience tier: novice, intermediate, advanced, expert
    #[arg(long)]
    pub tier: ExperienceTier,
    /// Geographic region, e.g. "Oregon"
    #[arg(long)]
    pub region: String,
    /// Free-text goals
    #[arg(long)]
    pub goals: String,
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the `waypoint init` command: write config file.
fn cmd_init(db_url: &str, api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let has_key = api_key.is_some();
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        model: config::ModelSection {
            api_key,
            ..Default::default()
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    if has_key {
        println!("  model.api_key = [set]");
    } else {
        println!(
            "  model.api_key not set; plans will be synthesized until {} is provided",
            config::API_KEY_ENV_VAR
        );
    }
    println!();
    println!("Next: run `waypoint db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `waypoint db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = WaypointConfig::resolve(cli_db_url)?;

    println!("Initializing waypoint database...");

    let db_pool = pool::bootstrap(&resolved.db_config).await?;

    let count = pool::record_count(&db_pool).await?;
    println!("Database ready. plan_records: {count} rows");

    db_pool.close().await;

    println!("waypoint db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            api_key,
            force,
        } => {
            cmd_init(&db_url, api_key, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Generate(args) => {
            let resolved = WaypointConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::cmd_generate(&resolved, &db_pool, args).await;
            db_pool.close().await;
            result?;
        }
        Commands::List { owner, json } => {
            let resolved = WaypointConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::cmd_list(&db_pool, &owner, json).await;
            db_pool.close().await;
            result?;
        }
        Commands::Show { id, json } => {
            let resolved = WaypointConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::cmd_show(&db_pool, &id, json).await;
            db_pool.close().await;
            result?;
        }
        Commands::Delete { id, owner } => {
            let resolved = WaypointConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::cmd_delete(&db_pool, &id, &owner).await;
            db_pool.close().await;
            result?;
        }
        Commands::Serve {
            bind,
            port,
            in_memory,
        } => {
            let resolved = WaypointConfig::resolve(cli.database_url.as_deref())?;
            plan_cmds::warn_if_model_disabled(&resolved);
            if in_memory {
                tracing::info!("using in-memory plan store; records are lost on exit");
                let store: Arc<dyn PlanStore> = Arc::new(MemoryPlanStore::new());
                let service = Arc::new(plan_cmds::build_service(&resolved, store)?);
                serve_cmd::run_serve(service, &bind, port).await?;
            } else {
                let db_pool = pool::create_pool(&resolved.db_config).await?;
                let store: Arc<dyn PlanStore> = Arc::new(PgPlanStore::new(db_pool.clone()));
                let service = Arc::new(plan_cmds::build_service(&resolved, store)?);
                let result = serve_cmd::run_serve(service, &bind, port).await;
                db_pool.close().await;
                result?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}

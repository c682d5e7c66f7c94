//! Configuration file management for waypoint.
//!
//! Provides a TOML-based config file at `~/.config/waypoint/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use waypoint_core::GeminiConfig;
use waypoint_db::config::DbConfig;

pub const API_KEY_ENV_VAR: &str = "WAYPOINT_MODEL_API_KEY";
pub const MODEL_ENV_VAR: &str = "WAYPOINT_MODEL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub model: ModelSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

/// `[model]` table. Every key is optional; unset keys use the Gemini defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the waypoint config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/waypoint` or `~/.config/waypoint`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("waypoint");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("waypoint")
}

/// Return the path to the waypoint config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Serialize and write the config file to the default location.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

/// Serialize and write `config` to `path`, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct WaypointConfig {
    pub db_config: DbConfig,
    pub model_config: GeminiConfig,
}

impl WaypointConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `WAYPOINT_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - API key: `WAYPOINT_MODEL_API_KEY` > `model.api_key` > empty (model disabled)
    /// - Model: `WAYPOINT_MODEL` > `model.model` > `gemini-pro`
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        Ok(Self::resolve_with(cli_db_url, load_config().ok()))
    }

    fn resolve_with(cli_db_url: Option<&str>, file_config: Option<ConfigFile>) -> Self {
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let section = file_config.map(|cfg| cfg.model).unwrap_or_default();
        let defaults = GeminiConfig::default();
        let model_config = GeminiConfig {
            api_key: std::env::var(API_KEY_ENV_VAR)
                .ok()
                .or(section.api_key)
                .unwrap_or_default(),
            model: std::env::var(MODEL_ENV_VAR)
                .ok()
                .or(section.model)
                .unwrap_or(defaults.model),
            endpoint: section.endpoint.unwrap_or(defaults.endpoint),
            timeout_secs: section.timeout_secs.unwrap_or(defaults.timeout_secs),
            temperature: defaults.temperature,
        };

        Self {
            db_config: DbConfig::new(db_url),
            model_config,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

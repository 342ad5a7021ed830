//! Configuration loading and resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the service starts with defaults and
//! logs a warning. A TOML file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_FILE_ENV: &str = "T2K_CONFIG";

/// Environment variable naming the database file
pub const DATABASE_ENV: &str = "T2K_DATABASE";

/// Environment variable naming the listen address
pub const BIND_ADDR_ENV: &str = "T2K_BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `t2k-api.toml`
///
/// All keys are optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// SQLite database file
    pub database_path: Option<PathBuf>,
    /// Listen address, e.g. `127.0.0.1:5780`
    pub bind_addr: Option<String>,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: Option<String>,
    /// Read from the precomputed summary tables first
    pub use_chart_summaries: Option<bool>,
    /// Rebuild the summary tables during startup
    pub refresh_summaries_on_startup: Option<bool>,
}

/// Values given on the command line (already parsed by the binary)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub log_level: Option<String>,
    pub refresh_summaries: bool,
    pub no_summaries: bool,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub log_level: String,
    pub use_chart_summaries: bool,
    pub refresh_summaries_on_startup: bool,
}

impl ServiceConfig {
    /// Merge CLI overrides, environment and TOML into one configuration
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Self {
        let database_path =
            resolve_database_path(cli.database_path.as_deref(), DATABASE_ENV, toml_config);

        let bind_addr = cli
            .bind_addr
            .clone()
            .or_else(|| non_empty_env(BIND_ADDR_ENV))
            .or_else(|| toml_config.bind_addr.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let log_level = cli
            .log_level
            .clone()
            .or_else(|| toml_config.log_level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let use_chart_summaries = !cli.no_summaries && toml_config.use_chart_summaries.unwrap_or(true);

        let refresh_summaries_on_startup =
            cli.refresh_summaries || toml_config.refresh_summaries_on_startup.unwrap_or(false);

        Self {
            database_path,
            bind_addr,
            log_level,
            use_chart_summaries,
            refresh_summaries_on_startup,
        }
    }

    /// Every resolved value as explicit TOML keys
    pub fn to_toml(&self) -> TomlConfig {
        TomlConfig {
            database_path: Some(self.database_path.clone()),
            bind_addr: Some(self.bind_addr.clone()),
            log_level: Some(self.log_level.clone()),
            use_chart_summaries: Some(self.use_chart_summaries),
            refresh_summaries_on_startup: Some(self.refresh_summaries_on_startup),
        }
    }
}

/// Database path resolution: CLI → environment → TOML → compiled default
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = non_empty_env(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.database_path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

/// Config file location: CLI → environment → platform config dir
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = non_empty_env(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    default_config_path()
}

/// `<config_dir>/top2000/t2k-api.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("top2000").join("t2k-api.toml"))
}

/// `<data_local_dir>/top2000/top2000.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("top2000").join("top2000.db"))
        .unwrap_or_else(|| PathBuf::from("./top2000_data/top2000.db"))
}

/// Load TOML config, falling back to defaults when the file does not exist
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}; using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Write TOML config (creates parent directories)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

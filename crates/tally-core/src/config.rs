use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the ledger database file.
pub const DB_ENV: &str = "TALLY_DB";

const DEFAULT_DB_FILE: &str = "tally/ledger.sqlite3";

/// Per-user settings from `<config_dir>/tally/config.toml`.
///
/// The effective date is intentionally absent: it never persists.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<String>,
}

#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tally/config.toml"))
}

/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_user_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// # Errors
///
/// Returns an error if `path` exists but cannot be read or parsed.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[must_use]
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DEFAULT_DB_FILE))
}

/// Resolve the ledger path: `--db`, then `TALLY_DB`, then the config file,
/// then the platform data directory.
///
/// # Errors
///
/// Returns an error when no source yields a path.
pub fn resolve_database_path(cli_db: Option<PathBuf>, user: &UserConfig) -> Result<PathBuf> {
    let env_db = env::var_os(DB_ENV).map(PathBuf::from);
    resolve_database_path_inner(cli_db, env_db, user.database.clone(), default_database_path())
}

fn resolve_database_path_inner(
    cli_db: Option<PathBuf>,
    env_db: Option<PathBuf>,
    config_db: Option<PathBuf>,
    fallback: Option<PathBuf>,
) -> Result<PathBuf> {
    let non_empty = |path: &PathBuf| !path.as_os_str().is_empty();
    if let Some(path) = cli_db
        .filter(non_empty)
        .or_else(|| env_db.filter(non_empty))
        .or_else(|| config_db.filter(non_empty))
        .or(fallback)
    {
        return Ok(path);
    }
    bail!("no ledger database path: pass --db, set {DB_ENV}, or set `database` in config.toml")
}

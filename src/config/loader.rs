//! Configuration file discovery and loading.
//!
//! Lookup order:
//! 1. `--config <path>` (must exist)
//! 2. `<config_dir>/modsync/config.yml`
//! 3. Built-in defaults
//!
//! The game directory can then be overridden by `MODSYNC_GAME_DIR` and by
//! `--game-dir`, in that order.

use crate::config::schema::Config;
use crate::config::validator::validate;
use crate::error::{ModsyncError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `game_dir`.
pub const GAME_DIR_ENV: &str = "MODSYNC_GAME_DIR";

/// User config location: `<config_dir>/modsync/config.yml`.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("modsync").join("config.yml"))
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ModsyncError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ModsyncError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a Config.
///
/// `source_path` is only used for error reporting. An empty document
/// yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(content).map_err(|e| ModsyncError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load, override and validate the configuration.
pub fn load_config(config_override: Option<&Path>, game_dir: Option<&Path>) -> Result<Config> {
    let config = match config_override {
        Some(path) => load_config_file(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!("Using config {}", path.display());
                load_config_file(&path)?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    let env_dir = std::env::var_os(GAME_DIR_ENV).map(PathBuf::from);
    let config = apply_game_dir_overrides(config, env_dir, game_dir.map(Path::to_path_buf));
    validate(&config)?;
    Ok(config)
}

/// Apply game directory overrides; later ones win.
pub fn apply_game_dir_overrides(
    mut config: Config,
    env_dir: Option<PathBuf>,
    flag_dir: Option<PathBuf>,
) -> Config {
    for dir in [env_dir, flag_dir].into_iter().flatten() {
        if !dir.as_os_str().is_empty() {
            config.game_dir = Some(dir);
        }
    }
    config
}

/// The configured game directory, or an error telling the user how to set it.
pub fn require_game_dir(config: &Config) -> Result<&Path> {
    config
        .game_dir
        .as_deref()
        .ok_or_else(|| ModsyncError::ConfigValidationError {
            message: format!(
                "game directory is not set (use --game-dir, {} or game_dir in config.yml)",
                GAME_DIR_ENV
            ),
        })
}

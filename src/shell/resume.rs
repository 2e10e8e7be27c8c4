//! Update checkpoint for resuming after an elevated restart.
//!
//! When extraction needs administrator rights, the running update saves
//! where it was, relaunches itself elevated, and the new process picks the
//! update up again at extraction with `update --resume`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Mutex;

// Override path for testing
static STATE_PATH_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// State saved before relaunching elevated.
///
/// # Example
///
/// ```no_run
/// use modsync::shell::ResumeState;
/// use std::path::PathBuf;
///
/// let state = ResumeState::new(
///     PathBuf::from("C:/Games/RainbowSix"),
///     PathBuf::from("C:/Temp/HeatedMetal.7z"),
///     "v1.4.0",
/// );
/// state.save().unwrap();
///
/// let loaded = ResumeState::load().unwrap().unwrap();
/// assert_eq!(loaded.tag, "v1.4.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeState {
    /// Installation root the update targets.
    pub game_dir: PathBuf,
    /// Downloaded archive awaiting extraction.
    pub archive: PathBuf,
    /// Release tag being installed.
    pub tag: String,
    /// When the restart was requested.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Config file the interrupted run was started with, as an absolute path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
}

impl ResumeState {
    /// Create a checkpoint stamped with the current time.
    pub fn new(game_dir: PathBuf, archive: PathBuf, tag: impl Into<String>) -> Self {
        Self {
            game_dir,
            archive,
            tag: tag.into(),
            timestamp: chrono::Utc::now(),
            config_path: None,
        }
    }

    /// Record the config file the update was started with.
    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    /// Arguments that make a restarted modsync continue this update.
    pub fn relaunch_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(path) = &self.config_path {
            args.push(OsString::from("--config"));
            args.push(path.clone().into_os_string());
        }
        args.push(OsString::from("update"));
        args.push(OsString::from("--resume"));
        args
    }

    /// Save resume state to disk.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::state_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Load resume state if it exists.
    pub fn load() -> Result<Option<Self>> {
        let path = Self::state_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(state))
    }

    /// Clear saved resume state.
    pub fn clear() -> Result<()> {
        let path = Self::state_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Check if there is a resume state available.
    pub fn exists() -> bool {
        Self::state_path().exists()
    }

    /// Get the resume state file path.
    pub fn state_path() -> PathBuf {
        if let Ok(guard) = STATE_PATH_OVERRIDE.lock() {
            if let Some(ref path) = *guard {
                return path.clone();
            }
        }
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("modsync")
            .join("resume-state.json")
    }

    /// Set the state path override (for testing).
    #[cfg(test)]
    pub fn set_state_path_override(path: Option<PathBuf>) {
        if let Ok(mut guard) = STATE_PATH_OVERRIDE.lock() {
            *guard = path;
        }
    }
}

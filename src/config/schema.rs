//! Configuration schema definitions for modsync.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format. Every section has defaults, so an empty file
//! (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extract::{default_candidates, ExtractionTool};
use crate::release::{AssetSelector, GITHUB_API_BASE};

/// Root configuration structure for config.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Game installation root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_dir: Option<PathBuf>,

    /// Release feed of the managed component
    pub feed: FeedConfig,

    /// File names inside the game directory
    pub layout: LayoutConfig,

    /// Archive extraction tools
    pub extract: ExtractConfig,

    /// Release feed of modsync itself
    pub self_update: SelfUpdateConfig,

    /// Release cache file (defaults to the user cache directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    /// Where release archives are downloaded (defaults to the temp directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

impl Config {
    /// Directory archives are downloaded into.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("modsync"))
    }
}

/// Release feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// API root, overridable for mirrors and tests
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    /// Environment variable holding an optional bearer token
    pub token_env: String,
    /// Asset to download; the first asset when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            owner: "DataCluster0".to_string(),
            repo: "HeatedMetal".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            asset: None,
        }
    }
}

impl FeedConfig {
    /// Which release asset to download.
    pub fn asset_selector(&self) -> AssetSelector {
        match &self.asset {
            Some(name) => AssetSelector::Named(name.clone()),
            None => AssetSelector::First,
        }
    }

    /// Token from the configured environment variable, if set.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok()
    }
}

/// Names of the files that make up an installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Executable that must exist in the game directory
    pub game_executable: String,
    /// Component directory, relative to the game directory
    pub component_dir: String,
    /// File name of the modified variant
    pub modified_file: String,
    /// File name of the stock variant
    pub stock_file: String,
    /// Companion loader marker, relative to the game directory
    pub loader_marker: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            game_executable: "RainbowSix.exe".to_string(),
            component_dir: "HeatedMetal".to_string(),
            modified_file: "HeatedMetal.dll".to_string(),
            stock_file: "HeatedMetal.dll.vanilla".to_string(),
            loader_marker: "HeliosLoader.json".to_string(),
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Candidate tools, tried in order
    pub tools: Vec<ExtractionTool>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            tools: default_candidates(),
        }
    }
}

/// Self-update settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfUpdateConfig {
    pub enabled: bool,
    pub owner: String,
    pub repo: String,
    /// Release asset holding the modsync binary
    pub asset: String,
}

impl Default for SelfUpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            owner: "modsync-dev".to_string(),
            repo: "modsync".to_string(),
            asset: format!("modsync{}", std::env::consts::EXE_SUFFIX),
        }
    }
}

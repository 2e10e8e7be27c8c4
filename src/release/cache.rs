//! Single-slot cache of the last successful feed response.
//!
//! The cache is not consulted on the happy path: it exists only so a
//! transport failure can fall back to the most recent known release.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File name of the default release cache.
const CACHE_FILE: &str = "release-cache.json";

/// Last successful raw feed document, stored in one file.
#[derive(Debug, Clone)]
pub struct ReleaseCache {
    path: PathBuf,
}

impl ReleaseCache {
    /// Cache stored at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user cache directory, or the temp dir.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("modsync")
            .join(CACHE_FILE)
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached document, if any.
    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Could not read release cache {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Overwrite the cache with a new document.
    pub fn store(&self, raw: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, raw)?;
        tracing::debug!("Release cache updated at {}", self.path.display());
        Ok(())
    }

    /// Remove the cache file if present.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for ReleaseCache {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

//! Where the component lives inside the game directory.

use std::path::{Path, PathBuf};

use crate::config::LayoutConfig;
use crate::error::{ModsyncError, Result};

use super::state::Variant;

/// Paths of an installation rooted at the game directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    game_dir: PathBuf,
    names: LayoutConfig,
}

impl InstallLayout {
    pub fn new(game_dir: impl Into<PathBuf>, names: LayoutConfig) -> Self {
        Self {
            game_dir: game_dir.into(),
            names,
        }
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn component_dir(&self) -> PathBuf {
        self.game_dir.join(&self.names.component_dir)
    }

    pub fn variant_path(&self, variant: Variant) -> PathBuf {
        let name = match variant {
            Variant::Modified => &self.names.modified_file,
            Variant::Stock => &self.names.stock_file,
        };
        self.component_dir().join(name)
    }

    /// Which variant file is on disk, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConflictingVariants` when both files exist.
    pub fn present_variant(&self) -> Result<Option<Variant>> {
        let modified = self.variant_path(Variant::Modified);
        let stock = self.variant_path(Variant::Stock);

        match (modified.is_file(), stock.is_file()) {
            (true, true) => Err(ModsyncError::ConflictingVariants {
                first: modified,
                second: stock,
            }),
            (true, false) => Ok(Some(Variant::Modified)),
            (false, true) => Ok(Some(Variant::Stock)),
            (false, false) => Ok(None),
        }
    }

    /// Whether the companion loader's marker file is present.
    pub fn has_loader_integration(&self) -> bool {
        self.game_dir.join(&self.names.loader_marker).is_file()
    }

    /// Check that the game directory contains the game executable.
    pub fn validate_game_dir(&self) -> Result<()> {
        if self.game_dir.join(&self.names.game_executable).is_file() {
            Ok(())
        } else {
            Err(ModsyncError::InvalidGameDirectory {
                path: self.game_dir.clone(),
                expected: self.names.game_executable.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout(temp: &TempDir) -> InstallLayout {
        InstallLayout::new(temp.path(), LayoutConfig::default())
    }

    #[test]
    fn variant_paths_live_in_component_dir() {
        let temp = TempDir::new().unwrap();
        let layout = layout(&temp);

        assert_eq!(
            layout.variant_path(Variant::Modified),
            temp.path().join("HeatedMetal").join("HeatedMetal.dll")
        );
        assert_eq!(
            layout.variant_path(Variant::Stock),
            temp.path().join("HeatedMetal").join("HeatedMetal.dll.vanilla")
        );
    }

    #[test]
    fn present_variant_detects_each_file() {
        let temp = TempDir::new().unwrap();
        let layout = layout(&temp);
        fs::create_dir_all(layout.component_dir()).unwrap();
        assert_eq!(layout.present_variant().unwrap(), None);

        fs::write(layout.variant_path(Variant::Stock), "x").unwrap();
        assert_eq!(layout.present_variant().unwrap(), Some(Variant::Stock));

        fs::write(layout.variant_path(Variant::Modified), "x").unwrap();
        assert!(matches!(
            layout.present_variant(),
            Err(ModsyncError::ConflictingVariants { .. })
        ));
    }

    #[test]
    fn present_variant_without_component_dir_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(layout(&temp).present_variant().unwrap(), None);
    }

    #[test]
    fn loader_marker_is_checked_at_game_root() {
        let temp = TempDir::new().unwrap();
        let layout = layout(&temp);
        assert!(!layout.has_loader_integration());

        fs::write(temp.path().join("HeliosLoader.json"), "{}").unwrap();
        assert!(layout.has_loader_integration());
    }

    #[test]
    fn game_dir_requires_executable() {
        let temp = TempDir::new().unwrap();
        let layout = layout(&temp);

        match layout.validate_game_dir() {
            Err(ModsyncError::InvalidGameDirectory { expected, .. }) => {
                assert_eq!(expected, "RainbowSix.exe")
            }
            other => panic!("expected InvalidGameDirectory, got {:?}", other),
        }

        fs::write(temp.path().join("RainbowSix.exe"), "").unwrap();
        assert!(layout.validate_game_dir().is_ok());
    }
}

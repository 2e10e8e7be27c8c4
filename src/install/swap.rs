//! Toggling between the stock and modified variants.

use std::fmt;
use std::fs;

use crate::error::{ModsyncError, Result};
use crate::progress::{ProgressEvent, ProgressObserver};

use super::layout::InstallLayout;
use super::state::Variant;

/// What a swap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped { from: Variant, to: Variant },
    /// Neither variant file was present.
    NothingToSwap,
}

impl fmt::Display for SwapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapOutcome::Swapped { from, to } => write!(f, "Switched from {} to {}", from, to),
            SwapOutcome::NothingToSwap => f.write_str("Nothing to swap"),
        }
    }
}

/// Renames the present variant file to the other variant's name.
#[derive(Debug, Clone)]
pub struct VariantSwapper {
    layout: InstallLayout,
}

impl VariantSwapper {
    pub fn new(layout: InstallLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Swap the installed variant with a single rename.
    ///
    /// # Errors
    ///
    /// - `DirectoryNotFound` if the component directory is missing; nothing
    ///   on disk is touched.
    /// - `ConflictingVariants` if both files exist.
    pub fn swap(&self, observer: &mut dyn ProgressObserver) -> Result<SwapOutcome> {
        observer.on_progress(ProgressEvent::new(0));

        let dir = self.layout.component_dir();
        if !dir.is_dir() {
            return Err(ModsyncError::DirectoryNotFound { path: dir });
        }
        observer.on_progress(ProgressEvent::new(25));

        let Some(from) = self.layout.present_variant()? else {
            tracing::info!("Nothing to swap in {}", dir.display());
            observer.on_progress(ProgressEvent::new(100));
            return Ok(SwapOutcome::NothingToSwap);
        };
        observer.on_progress(ProgressEvent::new(50));

        let to = from.other();
        let source = self.layout.variant_path(from);
        let target = self.layout.variant_path(to);
        fs::rename(&source, &target)?;
        tracing::info!("Renamed {} to {}", source.display(), target.display());

        observer.on_progress(ProgressEvent::new(100));
        Ok(SwapOutcome::Swapped { from, to })
    }
}

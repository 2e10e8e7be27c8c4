//! Installation state, derived on demand.

use std::fmt;

use crate::error::{ModsyncError, Result};
use crate::probe::{NativeLibrary, SystemLibrary, VersionProbe};
use crate::release::same_version;

use super::layout::InstallLayout;

/// The two mutually exclusive builds of the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Modified,
    Stock,
}

impl Variant {
    /// The variant a swap turns this one into.
    pub fn other(self) -> Variant {
        match self {
            Variant::Modified => Variant::Stock,
            Variant::Stock => Variant::Modified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::Modified => "modified",
            Variant::Stock => "stock",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Installed component version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalVersion {
    Known(String),
    /// Not installed, or the library could not be probed.
    Unknown,
}

impl LocalVersion {
    /// Whether this is the release `tag`. Unknown never matches.
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            LocalVersion::Known(version) => same_version(version, tag),
            LocalVersion::Unknown => false,
        }
    }
}

impl fmt::Display for LocalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalVersion::Known(version) => f.write_str(version),
            LocalVersion::Unknown => f.write_str("unknown"),
        }
    }
}

/// Snapshot of what is on disk. Re-derive after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationState {
    pub variant: Option<Variant>,
    pub local_version: LocalVersion,
}

/// Derives the current installation state.
pub trait StateInspector {
    fn inspect(&self) -> Result<InstallationState>;
}

/// Reads state from the filesystem and the component library.
pub struct LiveInspector<L: NativeLibrary = SystemLibrary> {
    layout: InstallLayout,
    probe: VersionProbe<L>,
}

impl<L: NativeLibrary> LiveInspector<L> {
    pub fn new(layout: InstallLayout) -> Self {
        Self {
            layout,
            probe: VersionProbe::new(),
        }
    }
}

impl<L: NativeLibrary> StateInspector for LiveInspector<L> {
    fn inspect(&self) -> Result<InstallationState> {
        let variant = self.layout.present_variant()?;

        let local_version = match variant {
            Some(variant) => {
                let path = self.layout.variant_path(variant);
                match self.probe.probe(&path) {
                    Ok(version) => LocalVersion::Known(version.text),
                    Err(
                        e @ (ModsyncError::LibraryNotFound { .. }
                        | ModsyncError::SymbolResolution { .. }),
                    ) => {
                        tracing::warn!("Installed version unknown: {}", e);
                        LocalVersion::Unknown
                    }
                    Err(e) => return Err(e),
                }
            }
            None => LocalVersion::Unknown,
        };

        tracing::debug!(
            "Installation state: variant={:?} version={}",
            variant,
            local_version
        );
        Ok(InstallationState {
            variant,
            local_version,
        })
    }
}

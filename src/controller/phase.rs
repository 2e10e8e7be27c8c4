//! Update workflow phases and outcomes.

use std::fmt;

/// Where the controller is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePhase {
    #[default]
    Idle,
    CheckingRelease,
    UpToDate,
    Downloading,
    Extracting,
    Installed,
    Failed,
    SwappingVariant,
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdatePhase::Idle => "idle",
            UpdatePhase::CheckingRelease => "checking release",
            UpdatePhase::UpToDate => "up to date",
            UpdatePhase::Downloading => "downloading",
            UpdatePhase::Extracting => "extracting",
            UpdatePhase::Installed => "installed",
            UpdatePhase::Failed => "failed",
            UpdatePhase::SwappingVariant => "swapping variant",
        };
        f.write_str(name)
    }
}

/// Result of a successful update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The installed version already matches the latest release.
    UpToDate { version: String },
    /// A release was installed. `verified` is false when the probed version
    /// afterwards did not match the release tag.
    Installed { version: String, verified: bool },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::UpToDate { version } => write!(f, "Already up to date ({})", version),
            UpdateOutcome::Installed {
                version,
                verified: true,
            } => write!(f, "Installed {}", version),
            UpdateOutcome::Installed {
                version,
                verified: false,
            } => write!(f, "Installed {} (version could not be confirmed)", version),
        }
    }
}

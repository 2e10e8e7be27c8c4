//! Error types for modsync operations.
//!
//! This module defines [`ModsyncError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each component reports its own failure kind (network, extraction, probe, ...)
//! - The update controller wraps component errors in [`ModsyncError::Workflow`]
//!   to record which step failed, without hiding the original error
//! - Use `anyhow::Error` (via `ModsyncError::Other`) for unexpected errors

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Core error type for modsync operations.
#[derive(Debug, Error)]
pub enum ModsyncError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The configured game directory does not look like a game install.
    #[error("{path} does not contain {expected}")]
    InvalidGameDirectory { path: PathBuf, expected: String },

    /// A version string had a non-numeric segment.
    #[error("Invalid version '{input}': segment '{segment}' is not a number")]
    InvalidVersion { input: String, segment: String },

    /// Transport failure or unexpected HTTP status.
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The release feed reported quota exhaustion.
    #[error("Release feed rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// The release feed response lacked expected fields.
    #[error("Malformed release feed: {message}")]
    MalformedFeed { message: String },

    /// No supported archive tool is installed.
    #[error("No extraction tool found (searched: {})", display_paths(.searched))]
    ToolNotFound { searched: Vec<PathBuf> },

    /// Extraction failed in a way that looks like antivirus interference.
    /// `stderr` is the tool's output verbatim.
    #[error("Extraction of {} was blocked, likely by antivirus: {}", .archive.display(), .stderr.trim())]
    AntivirusBlocked { archive: PathBuf, stderr: String },

    /// The extraction tool exited with a non-zero code.
    #[error("Extraction failed with exit code {:?}: {}", .exit_code, .stderr.trim())]
    ExtractionFailed {
        exit_code: Option<i32>,
        stderr: String,
        transient: bool,
    },

    /// The native library could not be loaded.
    #[error("Failed to load library {path}: {message}")]
    LibraryNotFound { path: PathBuf, message: String },

    /// A required export was not found by any resolution strategy.
    #[error("Entry point '{entry}' not found in {path}")]
    SymbolResolution { entry: String, path: PathBuf },

    /// The component installation directory does not exist.
    #[error("Installation directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Both variant files exist at once.
    #[error("Both {first} and {second} exist; remove one before continuing")]
    ConflictingVariants { first: PathBuf, second: PathBuf },

    /// Adding or removing an antivirus exclusion failed.
    #[error("Antivirus exclusion for {path} failed: {message}")]
    ExclusionFailed { path: PathBuf, message: String },

    /// An operation needs administrator rights and the user declined to restart.
    #[error("Administrator rights are required: {operation}")]
    ElevationRequired { operation: String },

    /// The user stopped the workflow.
    #[error("Aborted: {reason}")]
    Aborted { reason: String },

    /// A workflow step failed; `source` is the originating error.
    #[error("{step} failed: {source}")]
    Workflow {
        step: WorkflowStep,
        #[source]
        source: Box<ModsyncError>,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Steps of the update and swap workflows, used as error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    CheckingRelease,
    Downloading,
    Extracting,
    Verifying,
    SwappingVariant,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStep::CheckingRelease => "Checking release",
            WorkflowStep::Downloading => "Download",
            WorkflowStep::Extracting => "Extraction",
            WorkflowStep::Verifying => "Verification",
            WorkflowStep::SwappingVariant => "Variant swap",
        };
        f.write_str(name)
    }
}

impl ModsyncError {
    /// Wrap this error with the workflow step it came from.
    pub fn in_step(self, step: WorkflowStep) -> Self {
        ModsyncError::Workflow {
            step,
            source: Box::new(self),
        }
    }

    /// The originating error, looking through workflow context.
    pub fn root(&self) -> &ModsyncError {
        match self {
            ModsyncError::Workflow { source, .. } => source.root(),
            other => other,
        }
    }

    /// The step that failed, if this error carries workflow context.
    pub fn step(&self) -> Option<WorkflowStep> {
        match self {
            ModsyncError::Workflow { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether re-running the failed step may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            ModsyncError::Network { .. } => true,
            ModsyncError::ExtractionFailed { transient, .. } => *transient,
            _ => false,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for modsync operations.
pub type Result<T> = std::result::Result<T, ModsyncError>;

//! Antivirus exclusions for the extraction directory.

use std::path::{Path, PathBuf};

use crate::error::{ModsyncError, Result};
use crate::shell::{run_program, CommandOptions};

/// Adds and removes antivirus path exclusions.
pub trait ExclusionManager {
    /// Whether exclusions can be managed on this platform.
    fn is_supported(&self) -> bool;

    /// Exclude `path` from scanning. Requires administrator rights.
    fn add(&self, path: &Path) -> Result<()>;

    /// Remove a previously added exclusion.
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Microsoft Defender exclusions through PowerShell.
#[derive(Debug, Clone)]
pub struct DefenderExclusions {
    powershell: PathBuf,
}

impl DefenderExclusions {
    pub fn new() -> Self {
        Self {
            powershell: PathBuf::from("powershell"),
        }
    }

    fn run_cmdlet(&self, cmdlet: &str, path: &Path) -> Result<()> {
        if !self.is_supported() {
            return Err(ModsyncError::ExclusionFailed {
                path: path.to_path_buf(),
                message: "antivirus exclusions are only supported on Windows".to_string(),
            });
        }

        let script = cmdlet_script(cmdlet, path);
        tracing::debug!("Running {}", script);

        let result = run_program(
            &self.powershell,
            ["-NoProfile", "-NonInteractive", "-Command", script.as_str()],
            &CommandOptions::default(),
        )
        .map_err(|e| ModsyncError::ExclusionFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if result.success {
            Ok(())
        } else {
            Err(ModsyncError::ExclusionFailed {
                path: path.to_path_buf(),
                message: result.diagnostic().to_string(),
            })
        }
    }
}

impl Default for DefenderExclusions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionManager for DefenderExclusions {
    fn is_supported(&self) -> bool {
        cfg!(windows)
    }

    fn add(&self, path: &Path) -> Result<()> {
        self.run_cmdlet("Add-MpPreference", path)?;
        tracing::info!("Added antivirus exclusion for {}", path.display());
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.run_cmdlet("Remove-MpPreference", path)?;
        tracing::info!("Removed antivirus exclusion for {}", path.display());
        Ok(())
    }
}

/// PowerShell command line for a preference cmdlet, single-quoting the path.
fn cmdlet_script(cmdlet: &str, path: &Path) -> String {
    format!(
        "{} -ExclusionPath '{}'",
        cmdlet,
        path.display().to_string().replace('\'', "''")
    )
}

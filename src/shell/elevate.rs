//! Restarting with administrator rights.

use std::convert::Infallible;

use crate::error::{ModsyncError, Result};

use super::platform;
use super::resume::ResumeState;

/// Privilege checks and elevated relaunch.
pub trait Elevation {
    /// Whether the current process has administrator rights.
    fn is_elevated(&self) -> bool;

    /// Persist `checkpoint` and restart this program elevated.
    ///
    /// On success the current process exits, so this never returns `Ok`.
    fn relaunch(&self, checkpoint: &ResumeState) -> Result<Infallible>;
}

/// The real operating-system elevation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemElevation;

impl Elevation for SystemElevation {
    fn is_elevated(&self) -> bool {
        platform::is_elevated()
    }

    #[cfg(windows)]
    fn relaunch(&self, checkpoint: &ResumeState) -> Result<Infallible> {
        use super::command::{run_program, CommandOptions};
        use std::path::Path;

        let path = checkpoint.save()?;
        tracing::debug!("Saved update checkpoint to {}", path.display());

        let exe = std::env::current_exe()?;
        let script = format!(
            "Start-Process -FilePath {} -ArgumentList {} -Verb RunAs",
            powershell_quote(&exe.display().to_string()),
            argument_list(&checkpoint.relaunch_args())
        );

        let result = run_program(
            Path::new("powershell"),
            ["-NoProfile", "-NonInteractive", "-Command", script.as_str()],
            &CommandOptions::default(),
        )?;

        if !result.success {
            if let Err(e) = ResumeState::clear() {
                tracing::warn!("Could not clear update checkpoint: {}", e);
            }
            return Err(ModsyncError::ElevationRequired {
                operation: format!("elevated restart was refused: {}", result.diagnostic()),
            });
        }

        tracing::info!("Relaunched elevated; exiting");
        std::process::exit(0)
    }

    #[cfg(not(windows))]
    fn relaunch(&self, _checkpoint: &ResumeState) -> Result<Infallible> {
        Err(ModsyncError::ElevationRequired {
            operation: "run modsync again as root".to_string(),
        })
    }
}

/// Single-quote a PowerShell string literal.
#[cfg_attr(not(windows), allow(dead_code))]
fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `-ArgumentList` value for `args`. Start-Process joins the list with
/// spaces, so each argument carries its own double quotes.
#[cfg_attr(not(windows), allow(dead_code))]
fn argument_list(args: &[std::ffi::OsString]) -> String {
    args.iter()
        .map(|arg| powershell_quote(&format!("\"{}\"", arg.to_string_lossy())))
        .collect::<Vec<_>>()
        .join(",")
}

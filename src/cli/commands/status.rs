//! Status command implementation.
//!
//! The `modsync status` command shows what is installed and whether a newer
//! release exists.

use crate::cli::args::StatusArgs;
use crate::config::Config;
use crate::controller::UpdateController;
use crate::error::Result;
use crate::install::{InstallationState, LocalVersion};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    config: Config,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(config: Config, args: StatusArgs) -> Self {
        Self { config, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let controller = UpdateController::from_config(&self.config)?;
        let layout = controller.layout();

        ui.show_header("modsync status");
        ui.message(&format!("Game directory: {}", layout.game_dir().display()));
        if let Err(e) = layout.validate_game_dir() {
            ui.warning(&e.to_string());
        }

        let state = controller.inspect()?;
        show_state(&state, ui);

        let loader = if layout.has_loader_integration() {
            "detected"
        } else {
            "not detected"
        };
        ui.message(&format!("Companion loader: {}", loader));

        if self.args.offline {
            return Ok(CommandResult::success());
        }

        match controller.latest_release() {
            Ok(release) => {
                ui.message(&format!("Latest release: {}", release.tag));
                if state.variant.is_none() || !state.local_version.matches(&release.tag) {
                    ui.message(&format!(
                        "Run `modsync update` to install {}",
                        release.tag
                    ));
                }
            }
            Err(e) => ui.warning(&format!("Could not check for releases: {}", e)),
        }

        Ok(CommandResult::success())
    }
}

fn show_state(state: &InstallationState, ui: &mut dyn UserInterface) {
    match state.variant {
        Some(variant) => ui.message(&format!("Variant: {}", variant)),
        None => ui.message("Variant: not installed"),
    }

    if let LocalVersion::Known(version) = &state.local_version {
        ui.message(&format!("Installed version: {}", version));
    } else if state.variant.is_some() {
        ui.message("Installed version: unknown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::Variant;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn config(temp: &TempDir) -> Config {
        Config {
            game_dir: Some(temp.path().to_path_buf()),
            cache_path: Some(temp.path().join("cache.json")),
            ..Default::default()
        }
    }

    #[test]
    fn offline_status_reports_layout() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("RainbowSix.exe"), "").unwrap();
        fs::create_dir_all(temp.path().join("HeatedMetal")).unwrap();
        fs::write(temp.path().join("HeatedMetal").join("HeatedMetal.dll"), "not a dll").unwrap();
        fs::write(temp.path().join("HeliosLoader.json"), "{}").unwrap();

        let cmd = StatusCommand::new(config(&temp), StatusArgs { offline: true });
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Variant: modified"));
        assert!(ui.has_message("Installed version: unknown"));
        assert!(ui.has_message("Companion loader: detected"));
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn warns_about_invalid_game_directory() {
        let temp = TempDir::new().unwrap();
        let cmd = StatusCommand::new(config(&temp), StatusArgs { offline: true });
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_warning("RainbowSix.exe"));
        assert!(ui.has_message("Variant: not installed"));
    }

    #[test]
    fn state_lines_for_known_version() {
        let mut ui = MockUI::new();
        show_state(
            &InstallationState {
                variant: Some(Variant::Stock),
                local_version: LocalVersion::Known("1.4.0".into()),
            },
            &mut ui,
        );
        assert!(ui.has_message("Variant: stock"));
        assert!(ui.has_message("Installed version: 1.4.0"));
    }
}

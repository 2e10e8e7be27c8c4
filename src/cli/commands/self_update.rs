//! Self-update command implementation.
//!
//! `modsync self-update` replaces the running binary with the latest
//! release; `--check` only reports whether one is available.

use crate::cli::args::SelfUpdateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::progress::ProgressEvent;
use crate::shell::{run_program, CommandOptions};
use crate::ui::UserInterface;
use crate::updates::{detect_install_method, InstallMethod, SelfUpdater, UpdateInfo};

use super::dispatcher::{Command, CommandResult};

/// The self-update command implementation.
pub struct SelfUpdateCommand {
    config: Config,
    args: SelfUpdateArgs,
}

impl SelfUpdateCommand {
    pub fn new(config: Config, args: SelfUpdateArgs) -> Self {
        Self { config, args }
    }
}

impl Command for SelfUpdateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !self.config.self_update.enabled {
            ui.message("Self-update is disabled in the configuration");
            return Ok(CommandResult::success());
        }

        let updater = SelfUpdater::from_config(&self.config.self_update, &self.config.feed);
        let info = updater.check()?;

        if !info.update_available {
            ui.success(&format!("modsync {} is up to date", info.current));
            return Ok(CommandResult::success());
        }

        ui.message(&format!(
            "A new version of modsync is available: {} -> {}",
            info.current, info.latest
        ));
        if self.args.check {
            return Ok(CommandResult::success());
        }

        let method = detect_install_method();
        if !ui.confirm("self_update", "Would you like to update now?", true)? {
            return Ok(CommandResult::success());
        }

        apply(&updater, &info, &method, ui)
    }
}

fn apply(
    updater: &SelfUpdater,
    info: &UpdateInfo,
    method: &InstallMethod,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    match method {
        InstallMethod::Manual { path } => {
            let mut bar = ui.start_progress(&format!("Downloading modsync {}", info.latest));
            let applied = {
                let mut observer = |event: ProgressEvent| bar.set_percent(event.percent);
                updater.apply(info, path, &mut observer)
            };
            match applied {
                Ok(()) => {
                    bar.finish_success(&format!("Updated to {}", info.latest));
                    ui.message("Restart modsync to use the new version");
                    Ok(CommandResult::success())
                }
                Err(e) => {
                    bar.finish_error("Self-update failed");
                    Err(e)
                }
            }
        }
        InstallMethod::Cargo => {
            let Some(command) = method.update_command() else {
                return Ok(CommandResult::failure(1));
            };
            ui.message(&format!("Running {}", command.join(" ")));
            let result = run_program(
                std::path::Path::new(command[0]),
                &command[1..],
                &CommandOptions::default(),
            )?;
            if result.success {
                ui.success(&format!("Updated to {}", info.latest));
                Ok(CommandResult::success())
            } else {
                ui.error(result.diagnostic());
                Ok(CommandResult::failure(result.exit_code.unwrap_or(1)))
            }
        }
        InstallMethod::Unknown => {
            ui.warning("Could not locate the modsync executable; download the release manually");
            Ok(CommandResult::failure(1))
        }
    }
}

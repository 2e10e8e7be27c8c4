//! Update command implementation.
//!
//! `modsync update` installs the latest release; `modsync update --resume`
//! continues one that was interrupted by an administrator restart.

use std::path::PathBuf;

use crate::cli::args::UpdateArgs;
use crate::config::{load_config, Config};
use crate::controller::{UpdateController, UpdateOutcome};
use crate::error::{ModsyncError, Result};
use crate::shell::ResumeState;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The update command implementation.
pub struct UpdateCommand {
    config: Config,
    args: UpdateArgs,
    config_path: Option<PathBuf>,
}

impl UpdateCommand {
    /// Create a new update command.
    pub fn new(config: Config, args: UpdateArgs) -> Self {
        Self {
            config,
            args,
            config_path: None,
        }
    }

    /// The `--config` file `config` was loaded from. An elevated restart
    /// is handed the same file.
    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        // The elevated process does not start in our working directory
        self.config_path = config_path.map(|p| std::path::absolute(&p).unwrap_or(p));
        self
    }

    fn controller(
        &self,
        config: &Config,
        config_path: Option<PathBuf>,
    ) -> Result<UpdateController> {
        Ok(UpdateController::from_config(config)?.with_config_path(config_path))
    }

    fn resume(&self, ui: &mut dyn UserInterface) -> Result<UpdateOutcome> {
        let checkpoint = ResumeState::load()?.ok_or_else(|| ModsyncError::Aborted {
            reason: "there is no interrupted update to resume".to_string(),
        })?;
        // A checkpoint is only good for one attempt
        ResumeState::clear()?;

        let (mut config, config_path) = match (&self.config_path, &checkpoint.config_path) {
            (None, Some(path)) => (load_config(Some(path.as_path()), None)?, Some(path.clone())),
            _ => (self.config.clone(), self.config_path.clone()),
        };
        config.game_dir = Some(checkpoint.game_dir.clone());

        self.controller(&config, config_path)?
            .resume_update(&checkpoint, ui)
    }
}

impl Command for UpdateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header("modsync update");

        let outcome = if self.args.resume {
            self.resume(ui)?
        } else {
            self.controller(&self.config, self.config_path.clone())?
                .run_update(ui)?
        };

        report(&outcome, ui);
        Ok(CommandResult::success())
    }
}

fn report(outcome: &UpdateOutcome, ui: &mut dyn UserInterface) {
    match outcome {
        UpdateOutcome::Installed {
            verified: false, ..
        } => ui.warning(&outcome.to_string()),
        _ => ui.success(&outcome.to_string()),
    }
}

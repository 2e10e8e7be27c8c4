//! Swap command implementation.

use crate::config::Config;
use crate::controller::UpdateController;
use crate::error::Result;
use crate::install::SwapOutcome;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// `modsync swap`: toggle between the stock and modified variants.
pub struct SwapCommand {
    config: Config,
}

impl SwapCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Command for SwapCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut controller = UpdateController::from_config(&self.config)?;

        match controller.swap_variant(ui)? {
            outcome @ SwapOutcome::Swapped { .. } => ui.success(&outcome.to_string()),
            SwapOutcome::NothingToSwap => ui.message("Nothing to swap: neither variant is installed"),
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModsyncError;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn config(temp: &TempDir) -> Config {
        Config {
            game_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn swaps_installed_variant() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("HeatedMetal");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("HeatedMetal.dll.vanilla"), "stock").unwrap();

        let mut ui = MockUI::new();
        SwapCommand::new(config(&temp)).execute(&mut ui).unwrap();

        assert!(ui.has_success("Switched from stock to modified"));
        assert_eq!(fs::read_to_string(dir.join("HeatedMetal.dll")).unwrap(), "stock");
    }

    #[test]
    fn nothing_to_swap_still_succeeds() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("HeatedMetal")).unwrap();

        let mut ui = MockUI::new();
        let result = SwapCommand::new(config(&temp)).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Nothing to swap"));
    }

    #[test]
    fn missing_component_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = SwapCommand::new(config(&temp))
            .execute(&mut MockUI::new())
            .unwrap_err();
        assert!(matches!(err.root(), ModsyncError::DirectoryNotFound { .. }));
    }
}

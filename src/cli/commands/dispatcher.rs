//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, StatusArgs};
use crate::config::{load_config, Config};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: Option<PathBuf>,
    game_dir: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher with the global `--config` and `--game-dir` values.
    pub fn new(config_path: Option<PathBuf>, game_dir: Option<PathBuf>) -> Self {
        Self {
            config_path,
            game_dir,
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(cli.config.clone(), cli.game_dir.clone())
    }

    /// Explicit config file, if one was given.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load the configuration with command-line overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        load_config(self.config_path.as_deref(), self.game_dir.as_deref())
    }

    /// Dispatch and execute a command.
    ///
    /// Without a subcommand, shows the status.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.load_config()?;

        match &cli.command {
            Some(Commands::Status(args)) => {
                super::status::StatusCommand::new(config, args.clone()).execute(ui)
            }
            Some(Commands::Update(args)) => {
                super::update::UpdateCommand::new(config, args.clone())
                    .with_config_path(self.config_path.clone())
                    .execute(ui)
            }
            Some(Commands::Swap) => super::swap::SwapCommand::new(config).execute(ui),
            Some(Commands::SelfUpdate(args)) => {
                super::self_update::SelfUpdateCommand::new(config, args.clone()).execute(ui)
            }
            Some(Commands::Cache(args)) => {
                super::cache::CacheCommand::new(config, args.clone()).execute(ui)
            }
            None => super::status::StatusCommand::new(config, StatusArgs::default()).execute(ui),
        }
    }
}

//! Cache command implementation.
//!
//! Provides `modsync cache clear` and `modsync cache path`.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::release::ReleaseCache;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// Delete the cached release document.
    Clear,
    /// Print where the release document is cached.
    Path,
}

/// The cache command implementation.
pub struct CacheCommand {
    config: Config,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(config: Config, args: CacheArgs) -> Self {
        Self { config, args }
    }

    fn cache(&self) -> ReleaseCache {
        ReleaseCache::new(
            self.config
                .cache_path
                .clone()
                .unwrap_or_else(ReleaseCache::default_path),
        )
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cache = self.cache();

        match &self.args.command {
            CacheSubcommand::Clear => {
                if !cache.path().exists() {
                    ui.message("Cache is empty");
                } else {
                    cache.clear()?;
                    ui.success("Cleared release cache");
                }
            }
            CacheSubcommand::Path => ui.message(&cache.path().display().to_string()),
        }

        Ok(CommandResult::success())
    }
}

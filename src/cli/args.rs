//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::cache::CacheArgs;

/// modsync - Keep a game modification in sync with its releases.
#[derive(Debug, Parser)]
#[command(name = "modsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides the user config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Game installation directory (overrides MODSYNC_GAME_DIR)
    #[arg(short, long, global = true)]
    pub game_dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use prompt defaults (or MODSYNC_PROMPT_* answers) instead of asking
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the installed variant and version (default)
    Status(StatusArgs),

    /// Download and install the latest release
    Update(UpdateArgs),

    /// Switch between the stock and modified variants
    Swap,

    /// Update modsync itself
    SelfUpdate(SelfUpdateArgs),

    /// Manage the release cache
    Cache(CacheArgs),
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Don't query the release feed
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `update` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct UpdateArgs {
    /// Continue an update interrupted by an administrator restart
    #[arg(long)]
    pub resume: bool,
}

/// Arguments for the `self-update` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SelfUpdateArgs {
    /// Only report whether an update is available
    #[arg(long)]
    pub check: bool,
}

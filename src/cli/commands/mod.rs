//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! configuration once and routes CLI subcommands to their implementations.

pub mod cache;
pub mod dispatcher;
pub mod self_update;
pub mod status;
pub mod swap;
pub mod update;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

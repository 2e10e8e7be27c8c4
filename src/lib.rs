//! modsync - Keeps a locally installed game modification in sync with its
//! release feed.
//!
//! modsync checks the component's release feed, downloads and extracts new
//! releases (recovering from antivirus interference), reads the installed
//! version straight out of the component's native library, and toggles
//! between the stock and modified builds of the component.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`controller`] - Update and swap workflow orchestration
//! - [`download`] - Streaming HTTP downloads with progress
//! - [`error`] - Error types and result aliases
//! - [`extract`] - Archive extraction and failure recovery
//! - [`install`] - Installation layout, state, and variant swapping
//! - [`probe`] - Reading the installed version from the native library
//! - [`progress`] - Progress events and observers
//! - [`release`] - Release feed, cache, and version comparison
//! - [`shell`] - Process execution, elevation, and resume checkpoints
//! - [`ui`] - Interactive prompts, progress bars, and terminal output
//! - [`updates`] - Updating modsync itself
//!
//! # Example
//!
//! ```
//! use modsync::release::{is_newer, same_version};
//!
//! assert!(is_newer("v1.10", "1.9.3").unwrap());
//! assert!(same_version("v1.4", "1.4.0"));
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod extract;
pub mod install;
pub mod probe;
pub mod progress;
pub mod release;
pub mod shell;
pub mod ui;
pub mod updates;

pub use error::{ModsyncError, Result};

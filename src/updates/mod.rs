//! Update checking and self-updating functionality.
//!
//! This module provides:
//! - Install method detection (cargo, manual)
//! - Version checking against the latest modsync release
//! - Replacing the running binary with a downloaded release

pub mod install;
pub mod self_update;

pub use install::{detect_install_method, get_install_path, InstallMethod};
pub use self_update::{cleanup_stale_binary, replace_executable, SelfUpdater, UpdateInfo};

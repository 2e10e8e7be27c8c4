//! Install method detection.
//!
//! Detects how modsync was installed to determine the update mechanism.

use std::env;
use std::path::{Path, PathBuf};

/// How modsync was installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMethod {
    /// Installed via cargo install
    Cargo,
    /// Downloaded binary; replaced in place
    Manual { path: PathBuf },
    /// Could not determine install method
    Unknown,
}

impl InstallMethod {
    /// Package-manager command that updates this install, if any.
    pub fn update_command(&self) -> Option<Vec<&'static str>> {
        match self {
            InstallMethod::Cargo => Some(vec!["cargo", "install", "modsync", "--force"]),
            InstallMethod::Manual { .. } | InstallMethod::Unknown => None,
        }
    }

    /// Whether the binary can replace itself with a downloaded release.
    pub fn supports_self_replace(&self) -> bool {
        matches!(self, InstallMethod::Manual { .. })
    }

    /// Get a human-readable name for this install method.
    pub fn name(&self) -> &str {
        match self {
            InstallMethod::Cargo => "cargo",
            InstallMethod::Manual { .. } => "manual",
            InstallMethod::Unknown => "unknown",
        }
    }
}

/// Detect how modsync was installed.
pub fn detect_install_method() -> InstallMethod {
    let exe_path = match get_install_path() {
        Some(path) => path,
        None => return InstallMethod::Unknown,
    };

    if is_cargo_install(&exe_path) {
        return InstallMethod::Cargo;
    }

    InstallMethod::Manual { path: exe_path }
}

fn is_cargo_install(exe_path: &Path) -> bool {
    // Check if executable is in ~/.cargo/bin/
    if let Some(home) = dirs::home_dir() {
        let cargo_bin = home.join(".cargo").join("bin");
        if exe_path.starts_with(&cargo_bin) {
            return true;
        }
    }

    // Check CARGO_HOME environment variable
    if let Ok(cargo_home) = env::var("CARGO_HOME") {
        let cargo_bin = PathBuf::from(cargo_home).join("bin");
        if exe_path.starts_with(&cargo_bin) {
            return true;
        }
    }

    false
}

/// Get the path where modsync is installed.
pub fn get_install_path() -> Option<PathBuf> {
    env::current_exe().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_method_name() {
        assert_eq!(InstallMethod::Cargo.name(), "cargo");
        assert_eq!(
            InstallMethod::Manual {
                path: PathBuf::from("C:/Tools/modsync.exe")
            }
            .name(),
            "manual"
        );
        assert_eq!(InstallMethod::Unknown.name(), "unknown");
    }

    #[test]
    fn only_cargo_has_update_command() {
        assert_eq!(
            InstallMethod::Cargo.update_command(),
            Some(vec!["cargo", "install", "modsync", "--force"])
        );
        assert!(InstallMethod::Manual {
            path: PathBuf::from("/tmp/modsync")
        }
        .update_command()
        .is_none());
        assert!(InstallMethod::Unknown.update_command().is_none());
    }

    #[test]
    fn only_manual_installs_replace_themselves() {
        assert!(InstallMethod::Manual {
            path: PathBuf::from("/tmp/modsync")
        }
        .supports_self_replace());
        assert!(!InstallMethod::Cargo.supports_self_replace());
        assert!(!InstallMethod::Unknown.supports_self_replace());
    }

    #[test]
    fn get_install_path_returns_path() {
        // In test context, this is the test binary
        assert!(get_install_path().is_some());
    }

    #[test]
    fn is_cargo_install_with_cargo_bin() {
        if let Some(home) = dirs::home_dir() {
            let cargo_path = home.join(".cargo").join("bin").join("modsync");
            assert!(is_cargo_install(&cargo_path));
        }
    }

    #[test]
    fn is_cargo_install_with_random_path() {
        assert!(!is_cargo_install(Path::new("/tmp/modsync")));
    }
}

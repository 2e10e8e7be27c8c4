//! Downloaded archive that is deleted when dropped.

use std::path::{Path, PathBuf};

/// Owns a downloaded archive on disk.
///
/// The file is removed on drop, so it disappears whether the update
/// succeeds or fails. An elevated relaunch exits without running
/// destructors, which keeps the archive for the resumed process.
#[derive(Debug)]
pub struct DownloadedArchive {
    path: PathBuf,
}

impl DownloadedArchive {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DownloadedArchive {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}

/// File name for an archive downloaded from `url`.
pub fn archive_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("release-archive")
        .to_string()
}

//! Updating the modsync binary itself from its release feed.
//!
//! The new binary is downloaded next to the running one as `<exe>.new`.
//! The running binary is then renamed to `<exe>.old` (allowed even while
//! it runs on Windows) and the new one takes its place. The `.old` file is
//! removed the next time modsync starts.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{FeedConfig, SelfUpdateConfig};
use crate::download::{ArtifactFetcher, Downloader};
use crate::error::Result;
use crate::progress::ProgressObserver;
use crate::release::{
    is_newer, latest_release_url, AssetSelector, ReleaseCache, ReleaseResolver, ReleaseSource,
    VERSION,
};

/// Result of checking the modsync release feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    /// Running version.
    pub current: String,
    /// Latest release tag.
    pub latest: String,
    /// Download URL of the binary asset.
    pub download_url: String,
    /// Release notes.
    pub notes: String,
    /// Whether `latest` is newer than `current`.
    pub update_available: bool,
}

/// Checks for and installs new modsync releases.
pub struct SelfUpdater {
    releases: Box<dyn ReleaseSource>,
    fetcher: Box<dyn ArtifactFetcher>,
    current: String,
}

impl SelfUpdater {
    pub fn new(releases: impl ReleaseSource + 'static) -> Self {
        Self {
            releases: Box::new(releases),
            fetcher: Box::new(Downloader::new()),
            current: VERSION.to_string(),
        }
    }

    /// Updater for the configured modsync feed, sharing the API base of
    /// the component feed.
    pub fn from_config(settings: &SelfUpdateConfig, feed: &FeedConfig) -> Self {
        let cache = ReleaseCache::new(
            ReleaseCache::default_path().with_file_name("self-release-cache.json"),
        );
        let resolver = ReleaseResolver::new(
            latest_release_url(&feed.api_base, &settings.owner, &settings.repo),
            cache,
        )
        .with_token(feed.token())
        .with_asset(AssetSelector::Named(settings.asset.clone()));
        Self::new(resolver)
    }

    pub fn with_fetcher(mut self, fetcher: impl ArtifactFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current = version.into();
        self
    }

    /// Compare the latest release with the running version.
    pub fn check(&self) -> Result<UpdateInfo> {
        let release = self.releases.latest_release()?;
        let update_available = is_newer(&release.tag, &self.current)?;
        tracing::debug!(
            "modsync {} running, {} released",
            self.current,
            release.tag
        );

        Ok(UpdateInfo {
            current: self.current.clone(),
            latest: release.tag,
            download_url: release.download_url,
            notes: release.notes,
            update_available,
        })
    }

    /// Download the release in `info` and put it in place of `exe`.
    pub fn apply(
        &self,
        info: &UpdateInfo,
        exe: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<()> {
        let staged = sibling(exe, ".new");
        if let Err(e) = self.fetcher.fetch(&info.download_url, &staged, observer) {
            let _ = fs::remove_file(&staged);
            return Err(e);
        }
        replace_executable(exe, &staged)?;
        tracing::info!("Replaced {} with {}", exe.display(), info.latest);
        Ok(())
    }
}

/// Move `exe` aside to `<exe>.old` and `staged` into its place.
///
/// If the second rename fails the original binary is moved back.
pub fn replace_executable(exe: &Path, staged: &Path) -> Result<()> {
    make_executable(staged)?;

    let old = sibling(exe, ".old");
    if old.exists() {
        fs::remove_file(&old)?;
    }

    fs::rename(exe, &old)?;
    if let Err(e) = fs::rename(staged, exe) {
        if let Err(restore) = fs::rename(&old, exe) {
            tracing::warn!("Could not restore {}: {}", exe.display(), restore);
        }
        return Err(e.into());
    }
    Ok(())
}

/// Remove a binary left behind by a previous self-update.
///
/// Returns whether a stale binary was removed.
pub fn cleanup_stale_binary(exe: &Path) -> bool {
    let old = sibling(exe, ".old");
    if !old.exists() {
        return false;
    }
    match fs::remove_file(&old) {
        Ok(()) => {
            tracing::debug!("Removed {}", old.display());
            true
        }
        Err(e) => {
            tracing::warn!("Could not remove {}: {}", old.display(), e);
            false
        }
    }
}

/// `exe` with `suffix` appended to its file name.
fn sibling(exe: &Path, suffix: &str) -> PathBuf {
    let mut name = exe
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("modsync"));
    name.push(suffix);
    exe.with_file_name(name)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

//! Release discovery.
//!
//! - [`feed`] talks to the release feed
//! - [`cache`] keeps the last good feed document
//! - [`version`] compares dotted-numeric versions

pub mod cache;
pub mod feed;
pub mod version;

pub use cache::ReleaseCache;
pub use feed::{latest_release_url, parse_release, AssetSelector, ReleaseResolver, GITHUB_API_BASE};
pub use version::{is_newer, same_version, Version, VERSION};

use crate::error::Result;

/// A published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Release tag, e.g. `v1.4.0`.
    pub tag: String,
    /// URL of the selected asset.
    pub download_url: String,
    /// Release notes, possibly empty.
    pub notes: String,
}

/// Anything that can report the latest release.
pub trait ReleaseSource {
    fn latest_release(&self) -> Result<ReleaseInfo>;
}

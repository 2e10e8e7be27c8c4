//! Release feed client.
//!
//! Fetches the "latest release" document from a GitHub-compatible API,
//! selects the download asset and falls back to the last cached document
//! when the feed cannot be reached.

use std::time::Duration;

use chrono::DateTime;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;

use super::cache::ReleaseCache;
use super::{ReleaseInfo, ReleaseSource};
use crate::error::{ModsyncError, Result};

/// Default GitHub API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Header carrying the rate-limit reset time as a Unix timestamp.
const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Which release asset provides the download URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetSelector {
    /// The first asset of the release.
    #[default]
    First,
    /// The asset with exactly this name.
    Named(String),
}

/// Build the "latest release" endpoint for a repository.
pub fn latest_release_url(api_base: &str, owner: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/{}/releases/latest",
        api_base.trim_end_matches('/'),
        owner,
        repo
    )
}

/// Resolves the latest release from the feed.
pub struct ReleaseResolver {
    client: Client,
    url: String,
    token: Option<String>,
    asset: AssetSelector,
    cache: ReleaseCache,
}

impl ReleaseResolver {
    /// Create a resolver for a feed URL with a 30-second timeout.
    pub fn new(url: impl Into<String>, cache: ReleaseCache) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("modsync/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            url: url.into(),
            token: None,
            asset: AssetSelector::First,
            cache,
        }
    }

    /// Send `Authorization: Bearer <token>` with feed requests.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Select the download asset by name instead of taking the first one.
    pub fn with_asset(mut self, asset: AssetSelector) -> Self {
        self.asset = asset;
        self
    }

    /// The feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The fallback cache.
    pub fn cache(&self) -> &ReleaseCache {
        &self.cache
    }

    /// Fetch the latest release, falling back to the cache if the feed is unreachable.
    pub fn latest_release(&self) -> Result<ReleaseInfo> {
        match self.fetch() {
            Ok(raw) => {
                let info = parse_release(&raw, &self.asset)?;
                if let Err(e) = self.cache.store(&raw) {
                    tracing::warn!("Could not update release cache: {}", e);
                }
                tracing::info!("Latest release: {}", info.tag);
                Ok(info)
            }
            Err(err @ (ModsyncError::Network { .. } | ModsyncError::RateLimited { .. })) => {
                self.fallback(err)
            }
            Err(err) => Err(err),
        }
    }

    fn fallback(&self, err: ModsyncError) -> Result<ReleaseInfo> {
        let Some(raw) = self.cache.load() else {
            return Err(err);
        };

        match parse_release(&raw, &self.asset) {
            Ok(info) => {
                tracing::warn!("{}; using cached release {}", err, info.tag);
                Ok(info)
            }
            Err(cache_err) => {
                tracing::warn!("Cached release is unusable: {}", cache_err);
                Err(err)
            }
        }
    }

    fn fetch(&self) -> Result<String> {
        let mut request = self
            .client
            .get(&self.url)
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Fetching release feed {}", self.url);
        let response = request.send().map_err(|e| self.network(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let reset_at = response
                .headers()
                .get(RATE_LIMIT_RESET_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<i64>().ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0));

            if let Some(reset_at) = reset_at {
                return Err(ModsyncError::RateLimited { reset_at });
            }
        }

        if !status.is_success() {
            return Err(self.network(format!("HTTP {}", status)));
        }

        response
            .text()
            .map_err(|e| self.network(format!("failed to read response: {}", e)))
    }

    fn network(&self, message: String) -> ModsyncError {
        ModsyncError::Network {
            url: self.url.clone(),
            message,
        }
    }
}

impl ReleaseSource for ReleaseResolver {
    fn latest_release(&self) -> Result<ReleaseInfo> {
        ReleaseResolver::latest_release(self)
    }
}

/// Parse a raw feed document into a [`ReleaseInfo`].
pub fn parse_release(raw: &str, asset: &AssetSelector) -> Result<ReleaseInfo> {
    let doc: Value = serde_json::from_str(raw).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    let tag = doc
        .get("tag_name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing tag_name"))?;

    let notes = match doc.get("body") {
        Some(Value::String(body)) => body.clone(),
        Some(Value::Null) => String::new(),
        _ => return Err(malformed("missing body")),
    };

    let assets = doc
        .get("assets")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing assets"))?;

    let selected = match asset {
        AssetSelector::First => assets
            .first()
            .ok_or_else(|| malformed("release has no assets"))?,
        AssetSelector::Named(name) => assets
            .iter()
            .find(|a| a.get("name").and_then(Value::as_str) == Some(name.as_str()))
            .ok_or_else(|| malformed(format!("asset '{}' not found in release", name)))?,
    };

    let download_url = selected
        .get("browser_download_url")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("asset has no browser_download_url"))?;

    Ok(ReleaseInfo {
        tag: tag.to_string(),
        download_url: download_url.to_string(),
        notes,
    })
}

fn malformed(message: impl Into<String>) -> ModsyncError {
    ModsyncError::MalformedFeed {
        message: message.into(),
    }
}

//! Dotted-numeric version parsing and comparison.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{ModsyncError, Result};

/// Current version of modsync.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A dotted-numeric version such as `v1.2.10`.
///
/// Comparison pads the shorter sequence with zeros, so `1.2` equals `1.2.0`.
#[derive(Debug, Clone)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Parse a version, stripping a leading `v`.
    ///
    /// Every segment must be a non-negative integer; anything else is an
    /// [`ModsyncError::InvalidVersion`].
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let stripped = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let parts = stripped
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| ModsyncError::InvalidVersion {
                        input: input.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { parts })
    }

    /// Numeric components as written.
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    fn component(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = ModsyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&joined)
    }
}

/// Check whether `candidate` is strictly newer than `current`.
pub fn is_newer(candidate: &str, current: &str) -> Result<bool> {
    Ok(Version::parse(candidate)? > Version::parse(current)?)
}

/// Compare two version labels for equality.
///
/// Labels that both parse are compared numerically; otherwise the labels
/// are compared as text with any leading `v` removed.
pub fn same_version(a: &str, b: &str) -> bool {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => strip_v(a) == strip_v(b),
    }
}

fn strip_v(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('v')
        .or_else(|| s.strip_prefix('V'))
        .unwrap_or(s)
}

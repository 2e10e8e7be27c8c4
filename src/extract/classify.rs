//! Classification of extraction failures.

use std::sync::LazyLock;

use regex::Regex;

/// Stderr wording that indicates antivirus or permission interference.
static BLOCKED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)virus|blocked|access( is)? denied").expect("BLOCKED_REGEX must compile")
});

/// Stderr wording that indicates a temporary condition.
static TRANSIENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)being used by another process|sharing violation")
        .expect("TRANSIENT_REGEX must compile")
});

/// 7-Zip exit code for "not enough memory".
const SEVEN_ZIP_OUT_OF_MEMORY: i32 = 8;

/// How an extraction failure should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// May succeed if simply retried.
    Transient,
    /// Interference from antivirus or permissions; needs an exclusion.
    Blocked,
    /// Anything else.
    Fatal,
}

/// Classify a failed extraction from its exit code and stderr.
pub fn classify_failure(exit_code: Option<i32>, stderr: &str) -> FailureClass {
    if BLOCKED_REGEX.is_match(stderr) {
        FailureClass::Blocked
    } else if TRANSIENT_REGEX.is_match(stderr) || exit_code == Some(SEVEN_ZIP_OUT_OF_MEMORY) {
        FailureClass::Transient
    } else {
        FailureClass::Fatal
    }
}

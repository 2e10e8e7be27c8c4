//! Configuration validation rules.
//!
//! - Layout file names must be non-empty
//! - The two variant names must differ
//! - Feed owner and repository must be set

use crate::config::schema::Config;
use crate::error::{ModsyncError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Config key the error applies to
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &Config) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_layout(config));
    errors.extend(validate_feed(config));

    errors
}

fn validate_layout(config: &Config) -> Vec<ValidationError> {
    let layout = &config.layout;
    let mut errors = Vec::new();

    for (field, value) in [
        ("layout.game_executable", &layout.game_executable),
        ("layout.component_dir", &layout.component_dir),
        ("layout.modified_file", &layout.modified_file),
        ("layout.stock_file", &layout.stock_file),
        ("layout.loader_marker", &layout.loader_marker),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, format!("{} must not be empty", field)));
        }
    }

    if !layout.modified_file.is_empty() && layout.modified_file == layout.stock_file {
        errors.push(ValidationError::new(
            "layout.stock_file",
            format!(
                "layout.modified_file and layout.stock_file are both '{}'",
                layout.stock_file
            ),
        ));
    }

    errors
}

fn validate_feed(config: &Config) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.feed.owner.trim().is_empty() {
        errors.push(ValidationError::new("feed.owner", "feed.owner must not be empty"));
    }
    if config.feed.repo.trim().is_empty() {
        errors.push(ValidationError::new("feed.repo", "feed.repo must not be empty"));
    }

    errors
}

/// Validate a configuration.
///
/// # Errors
///
/// Returns `ConfigValidationError` listing every failed rule.
pub fn validate(config: &Config) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(ModsyncError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

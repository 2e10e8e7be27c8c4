//! Non-interactive UI for scripted/headless runs.

use std::collections::HashMap;

use crate::error::{ModsyncError, Result};

use super::theme::ModsyncTheme;
use super::{parse_bool, OutputMode, ProgressHandle, Prompt, PromptResult, PromptType, UserInterface};

/// Prefix for environment variables that answer prompts.
pub const PROMPT_ENV_PREFIX: &str = "MODSYNC_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `MODSYNC_PROMPT_<KEY>` environment variables,
/// falling back to the prompt's default. Progress is printed once per
/// operation when it finishes, so logs stay readable.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    fn answer(prompt: &Prompt, value: &str) -> Result<PromptResult> {
        match prompt.prompt_type {
            PromptType::Confirm => parse_bool(value).map(PromptResult::Bool).ok_or_else(|| {
                ModsyncError::ConfigValidationError {
                    message: format!("'{}' is not a yes/no answer for '{}'", value, prompt.key),
                }
            }),
            PromptType::Input => Ok(PromptResult::String(value.to_string())),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            return Self::answer(prompt, value);
        }

        if let Some(default) = &prompt.default {
            return Self::answer(prompt, default);
        }

        Err(ModsyncError::ConfigValidationError {
            message: format!(
                "Cannot prompt for '{}' in non-interactive mode (set {})",
                prompt.key, env_key
            ),
        })
    }

    fn start_progress(&mut self, message: &str) -> Box<dyn ProgressHandle> {
        if self.mode.shows_status() {
            println!("  {}", message);
        }
        Box::new(LineProgress {
            visible: self.mode.shows_progress(),
            percent: 0,
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Progress that prints only its final line.
struct LineProgress {
    visible: bool,
    percent: u8,
}

impl ProgressHandle for LineProgress {
    fn set_percent(&mut self, percent: u8) {
        self.percent = percent.min(100);
    }

    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.visible {
            println!("{}", ModsyncTheme::plain().format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!(
            "{} ({}%)",
            ModsyncTheme::plain().format_error(msg),
            self.percent
        );
    }
}

//! Interactive user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for scripted or headless runs
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use modsync::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("modsync");
//! ui.success("Up to date");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod prompts;
pub mod terminal;
pub mod theme;

pub use mock::{MockProgress, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::PercentBar;
pub use prompts::prompt_user;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, ModsyncTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a percentage progress indicator for an operation.
    fn start_progress(&mut self, message: &str) -> Box<dyn ProgressHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;

    /// Ask a yes/no question.
    fn confirm(&mut self, key: &str, question: &str, default: bool) -> Result<bool> {
        let prompt = Prompt {
            key: key.to_string(),
            question: question.to_string(),
            prompt_type: PromptType::Confirm,
            default: Some(default.to_string()),
        };
        Ok(self.prompt(&prompt)?.as_bool().unwrap_or(default))
    }
}

/// Handle for controlling a progress indicator.
pub trait ProgressHandle {
    /// Move the indicator to `percent` (0-100).
    fn set_percent(&mut self, percent: u8);

    /// Update the message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used for overrides and test responses).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// The type of prompt.
    pub prompt_type: PromptType,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

/// The type of prompt.
#[derive(Debug, Clone)]
pub enum PromptType {
    /// Yes/no confirmation.
    Confirm,
    /// Free-form text input.
    Input,
}

/// Result of a prompt.
#[derive(Debug, Clone)]
pub enum PromptResult {
    /// Boolean result from confirm.
    Bool(bool),
    /// String result from input.
    String(String),
}

impl PromptResult {
    /// Get as string.
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Get as bool. Text answers such as `yes` or `1` count as true.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => parse_bool(s),
        }
    }
}

/// Interpret a textual yes/no answer.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_result_as_string() {
        assert_eq!(PromptResult::Bool(true).as_string(), "true");
        assert_eq!(PromptResult::String("hello".into()).as_string(), "hello");
    }

    #[test]
    fn prompt_result_as_bool() {
        assert_eq!(PromptResult::Bool(true).as_bool(), Some(true));
        assert_eq!(PromptResult::String("yes".into()).as_bool(), Some(true));
        assert_eq!(PromptResult::String("N".into()).as_bool(), Some(false));
        assert_eq!(PromptResult::String("maybe".into()).as_bool(), None);
    }

    #[test]
    fn confirm_uses_default_when_answer_is_unclear() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("proceed", "maybe");
        assert!(ui.confirm("proceed", "Proceed?", true).unwrap());
    }

    #[test]
    fn confirm_uses_configured_answer() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("proceed", "no");
        assert!(!ui.confirm("proceed", "Proceed?", true).unwrap());
        assert_eq!(ui.prompts_shown(), &["proceed".to_string()]);
    }
}

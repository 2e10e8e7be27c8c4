//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt responses.
//!
//! # Example
//!
//! ```
//! use modsync::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("add_exclusion", "yes");
//!
//! assert!(ui.confirm("add_exclusion", "Add an exclusion?", false).unwrap());
//! assert_eq!(ui.prompts_shown(), &["add_exclusion".to_string()]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::Result;

use super::{parse_bool, OutputMode, ProgressHandle, Prompt, PromptResult, PromptType, UserInterface};

/// Mock UI implementation for testing.
///
/// Captures all UI interactions and allows pre-configured prompt responses.
/// Supports both single responses (via `set_prompt_response`) and queued
/// responses (via `queue_prompt_responses`) for keys asked multiple times.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    progress_bars: Vec<String>,
    percents: Arc<Mutex<Vec<u8>>>,
    prompt_responses: HashMap<String, String>,
    prompt_queues: HashMap<String, VecDeque<String>>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    /// Queue multiple responses for the same prompt key.
    ///
    /// Responses are returned in order. After the queue is exhausted,
    /// falls back to `set_prompt_response` or defaults.
    pub fn queue_prompt_responses(&mut self, key: &str, responses: Vec<&str>) {
        let queue = responses.into_iter().map(|s| s.to_string()).collect();
        self.prompt_queues.insert(key.to_string(), queue);
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Messages of every progress bar that was started.
    pub fn progress_bars(&self) -> &[String] {
        &self.progress_bars
    }

    /// Every percentage reported to any progress bar, in order.
    pub fn percents(&self) -> Vec<u8> {
        self.percents
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Get all prompts that were shown (by key).
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Check if a specific message was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific success was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific warning was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    fn to_result(prompt: &Prompt, response: String) -> PromptResult {
        match prompt.prompt_type {
            // Unclear answers stay text so `confirm` falls back to its default
            PromptType::Confirm => parse_bool(&response)
                .map(PromptResult::Bool)
                .unwrap_or(PromptResult::String(response)),
            PromptType::Input => PromptResult::String(response),
        }
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        // Queued responses first (for keys asked multiple times)
        if let Some(response) = self
            .prompt_queues
            .get_mut(&prompt.key)
            .and_then(VecDeque::pop_front)
        {
            return Ok(Self::to_result(prompt, response));
        }

        if let Some(response) = self.prompt_responses.get(&prompt.key) {
            return Ok(Self::to_result(prompt, response.clone()));
        }

        if let Some(default) = &prompt.default {
            return Ok(Self::to_result(prompt, default.clone()));
        }

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(false),
            PromptType::Input => PromptResult::String(String::new()),
        })
    }

    fn start_progress(&mut self, message: &str) -> Box<dyn ProgressHandle> {
        self.progress_bars.push(message.to_string());
        Box::new(MockProgress {
            percents: Arc::clone(&self.percents),
            finish_message: None,
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Mock progress bar that records percentages into its parent [`MockUI`].
#[derive(Debug, Default)]
pub struct MockProgress {
    percents: Arc<Mutex<Vec<u8>>>,
    finish_message: Option<String>,
}

impl MockProgress {
    /// The message the bar finished with, if any.
    pub fn finish_message(&self) -> Option<&str> {
        self.finish_message.as_deref()
    }
}

impl ProgressHandle for MockProgress {
    fn set_percent(&mut self, percent: u8) {
        if let Ok(mut p) = self.percents.lock() {
            p.push(percent);
        }
    }

    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
    }
}

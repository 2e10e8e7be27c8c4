//! Percentage progress bars.

use indicatif::{ProgressBar, ProgressStyle};

use super::theme::ModsyncTheme;
use super::ProgressHandle;

const BAR_TEMPLATE: &str = "{msg:<14} [{bar:32.cyan/dim}] {pos:>3}%";

/// A 0-100 progress bar for downloads, extraction and swaps.
pub struct PercentBar {
    bar: ProgressBar,
    theme: ModsyncTheme,
}

impl PercentBar {
    /// Create a visible bar with a message.
    pub fn new(message: &str, theme: ModsyncTheme) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message(message.to_string());
        Self { bar, theme }
    }

    /// Create a bar that doesn't draw (for silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: ModsyncTheme::plain(),
        }
    }

    /// Current position (0-100).
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    fn finish_with(&mut self, line: String) {
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar.finish_with_message(line);
    }
}

impl ProgressHandle for PercentBar {
    fn set_percent(&mut self, percent: u8) {
        self.bar.set_position(u64::from(percent.min(100)));
    }

    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }
}

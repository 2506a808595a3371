//! User-facing output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//!
//! Logs go through `tracing`; this is what the user reads.
//!
//! # Example
//!
//! ```
//! use kindling::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("kindling");
//! ui.success("Toolchain ready");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, KindlingTheme};

use std::time::Duration;

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

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a contextual hint.
    fn show_hint(&mut self, hint: &str);

    /// Show the end-of-run summary.
    fn show_run_summary(&mut self, summary: &RunSummary);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// How a pipeline stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    Skipped,
    Failed,
}

impl StageStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            StageStatus::Completed => "✓",
            StageStatus::Skipped => "○",
            StageStatus::Failed => "✗",
        }
    }

    /// Icon styled with the theme.
    pub fn styled(&self, theme: &KindlingTheme) -> String {
        let style = match self {
            StageStatus::Completed => &theme.success,
            StageStatus::Skipped => &theme.dim,
            StageStatus::Failed => &theme.error,
        };
        style.apply_to(self.icon()).to_string()
    }
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub name: String,
    pub status: StageStatus,
    pub detail: Option<String>,
}

impl StageResult {
    pub fn new(name: &str, status: StageStatus, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            name: name.to_string(),
            status,
            detail: (!detail.is_empty()).then_some(detail),
        }
    }
}

/// Summary shown at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stage_results: Vec<StageResult>,
    pub total_duration: Duration,
    pub success: bool,
}

impl RunSummary {
    pub fn stages_run(&self) -> usize {
        self.count(StageStatus::Completed)
    }

    pub fn stages_skipped(&self) -> usize {
        self.count(StageStatus::Skipped)
    }

    /// Status of a named stage, if it was reached.
    pub fn status_of(&self, name: &str) -> Option<StageStatus> {
        self.stage_results
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.status)
    }

    fn count(&self, status: StageStatus) -> usize {
        self.stage_results
            .iter()
            .filter(|s| s.status == status)
            .count()
    }
}

/// Format a duration for display (e.g. `850ms`, `12.3s`, `2m 05s`).
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

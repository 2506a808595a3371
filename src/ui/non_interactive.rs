//! Non-interactive UI for CI/headless environments.

use super::theme::KindlingTheme;
use super::{format_duration, OutputMode, RunSummary, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Plain line-oriented output with no cursor movement, so logs captured by
/// CI stay readable.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_messages() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("⚠ {}", msg);
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_messages() {
            println!("  {}", message);
        }
        Box::new(NoopSpinner)
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_messages() {
            println!("\n{}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_messages() {
            println!("  {}", hint);
        }
    }

    fn show_run_summary(&mut self, summary: &RunSummary) {
        println!();
        println!("  ┌─ Summary ──────────────────────────");
        for stage in &summary.stage_results {
            println!(
                "  │ {} {:<12} {}",
                stage.status.icon(),
                stage.name,
                stage.detail.as_deref().unwrap_or("")
            );
        }
        println!("  ├────────────────────────────────────");
        println!(
            "  │ Total: {} · {} run · {} skipped",
            format_duration(summary.total_duration),
            summary.stages_run(),
            summary.stages_skipped(),
        );
        println!("  └────────────────────────────────────");
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only its final line.
struct NoopSpinner;

impl NoopSpinner {
    fn finish(&self, line: String) {
        println!("  {}", line);
    }
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.finish(KindlingTheme::plain().format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(KindlingTheme::plain().format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish(KindlingTheme::plain().format_skipped(msg));
    }
}

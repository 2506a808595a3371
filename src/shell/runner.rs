//! The seam between the provisioning engine and the machine it mutates.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

use super::command::{execute, CommandOptions, CommandResult, Invocation};
use super::path::{augmented_path, cargo_bin_dir, resolve_tool_path};

/// Runs external commands and answers search-path questions.
///
/// Every call observes the machine as it is now; implementations must not
/// cache lookups, because installs change the answers.
pub trait CommandRunner {
    /// Run an invocation to completion.
    fn run(&self, invocation: &Invocation) -> Result<CommandResult>;

    /// Find a program on the search path.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Block the calling thread.
    fn pause(&self, delay: Duration) {
        std::thread::sleep(delay);
    }

    /// Whether a program is on the search path.
    fn is_available(&self, program: &str) -> bool {
        self.locate(program).is_some()
    }
}

/// Runs commands on the local machine.
///
/// The search path is the rustup binary directory followed by the inherited
/// `PATH`, so a manager installed by the network bootstrap is visible to later
/// lookups and to child processes without restarting the shell, and its
/// toolchain wins over a system compiler.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    search_path: Vec<PathBuf>,
}

impl SystemRunner {
    /// Create a runner over the cargo bin directory and the inherited PATH.
    pub fn new() -> Self {
        let extra: Vec<PathBuf> = cargo_bin_dir().into_iter().collect();
        Self {
            search_path: augmented_path(&extra),
        }
    }

    /// Create a runner over an explicit search path.
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// The directories searched for programs.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        let options = CommandOptions {
            search_path: Some(self.search_path.clone()),
        };
        let result = execute(invocation, &options)?;
        tracing::debug!(
            command = %invocation,
            exit_code = ?result.exit_code,
            elapsed_ms = result.duration.as_millis() as u64,
            "command finished"
        );
        Ok(result)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        resolve_tool_path(program, &self.search_path)
    }
}

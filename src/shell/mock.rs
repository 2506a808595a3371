//! Scripted command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] without touching the machine.
//! Commands are matched by their full command line. Unscripted commands
//! succeed with empty output, so tests only describe what matters to them.
//!
//! # Example
//!
//! ```
//! use kindling::shell::{CommandRunner, Invocation, MockRunner};
//!
//! let runner = MockRunner::new()
//!     .with_output("rustc --version", "rustc 1.75.0 (82e1608df 2023-12-21)")
//!     .with_program("rustc");
//!
//! let result = runner.run(&Invocation::new("rustc").arg("--version")).unwrap();
//! assert!(result.stdout.contains("1.75.0"));
//! assert!(runner.ran("rustc --version"));
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{KindlingError, Result};

use super::command::{CommandResult, Invocation};
use super::runner::CommandRunner;

/// A program that shows up on the search path once a command succeeds.
#[derive(Debug, Clone)]
struct Provision {
    program: String,
    /// Lookups that still miss after the providing command succeeded.
    misses: u32,
}

/// Scripted [`CommandRunner`] that records every interaction.
#[derive(Debug, Default)]
pub struct MockRunner {
    available: RefCell<HashSet<String>>,
    pending: RefCell<HashMap<String, u32>>,
    responses: RefCell<HashMap<String, VecDeque<CommandResult>>>,
    fixed: HashMap<String, CommandResult>,
    missing_programs: HashSet<String>,
    provides: HashMap<String, Vec<Provision>>,
    calls: RefCell<Vec<String>>,
    lookups: RefCell<Vec<String>>,
    pauses: RefCell<Vec<Duration>>,
}

fn ok(stdout: &str) -> CommandResult {
    CommandResult::success(stdout.to_string(), String::new(), Duration::ZERO)
}

fn failed(stderr: &str) -> CommandResult {
    CommandResult::failure(Some(1), String::new(), stderr.to_string(), Duration::ZERO)
}

impl MockRunner {
    /// Create a runner with nothing on the search path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a program on the search path.
    pub fn with_program(self, program: &str) -> Self {
        self.available.borrow_mut().insert(program.to_string());
        self
    }

    /// Answer a command line with successful output, every time.
    pub fn with_output(mut self, command_line: &str, stdout: &str) -> Self {
        self.fixed.insert(command_line.to_string(), ok(stdout));
        self
    }

    /// Make a command line fail with the given stderr, every time.
    pub fn with_failure(mut self, command_line: &str, stderr: &str) -> Self {
        self.fixed.insert(command_line.to_string(), failed(stderr));
        self
    }

    /// Answer a command line with a specific result, every time.
    pub fn with_result(mut self, command_line: &str, result: CommandResult) -> Self {
        self.fixed.insert(command_line.to_string(), result);
        self
    }

    /// Queue one-shot results for a command line, consumed in order before
    /// falling back to the fixed response.
    pub fn with_sequence(self, command_line: &str, results: Vec<CommandResult>) -> Self {
        self.responses
            .borrow_mut()
            .insert(command_line.to_string(), results.into_iter().collect());
        self
    }

    /// Make spawning a program fail as if it did not exist.
    pub fn with_unspawnable(mut self, program: &str) -> Self {
        self.missing_programs.insert(program.to_string());
        self
    }

    /// When `command_line` succeeds, `program` appears on the search path.
    pub fn provides(self, command_line: &str, program: &str) -> Self {
        self.provides_after(command_line, program, 0)
    }

    /// When `command_line` succeeds, `program` appears on the search path
    /// after `misses` further lookups have failed.
    pub fn provides_after(mut self, command_line: &str, program: &str, misses: u32) -> Self {
        self.provides
            .entry(command_line.to_string())
            .or_default()
            .push(Provision {
                program: program.to_string(),
                misses,
            });
        self
    }

    /// Every command line run, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether a command line was run.
    pub fn ran(&self, command_line: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == command_line)
    }

    /// How many times a command line was run.
    pub fn run_count(&self, command_line: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| *c == command_line)
            .count()
    }

    /// How many times a program was looked up.
    pub fn lookup_count(&self, program: &str) -> usize {
        self.lookups
            .borrow()
            .iter()
            .filter(|p| *p == program)
            .count()
    }

    /// Every pause requested, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }

    fn respond(&self, command_line: &str) -> CommandResult {
        if let Some(queue) = self.responses.borrow_mut().get_mut(command_line) {
            if let Some(result) = queue.pop_front() {
                return result;
            }
        }
        self.fixed
            .get(command_line)
            .cloned()
            .unwrap_or_else(|| ok(""))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        let line = invocation.command_line();
        self.calls.borrow_mut().push(line.clone());

        if self.missing_programs.contains(&invocation.program) {
            return Err(KindlingError::CommandNotFound {
                program: invocation.program.clone(),
            });
        }

        let result = self.respond(&line);
        if result.success {
            for provision in self.provides.get(&line).into_iter().flatten() {
                if provision.misses == 0 {
                    self.available
                        .borrow_mut()
                        .insert(provision.program.clone());
                } else {
                    self.pending
                        .borrow_mut()
                        .insert(provision.program.clone(), provision.misses);
                }
            }
        }
        Ok(result)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.lookups.borrow_mut().push(program.to_string());

        let mut pending = self.pending.borrow_mut();
        if let Some(remaining) = pending.get_mut(program) {
            if *remaining > 0 {
                *remaining -= 1;
                return None;
            }
            pending.remove(program);
            self.available.borrow_mut().insert(program.to_string());
        }

        self.available
            .borrow()
            .contains(program)
            .then(|| PathBuf::from("/mock/bin").join(program))
    }

    fn pause(&self, delay: Duration) {
        self.pauses.borrow_mut().push(delay);
    }
}

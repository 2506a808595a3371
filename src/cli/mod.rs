//! Command-line interface for Kindling.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Commands, CompletionsArgs, PackageArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};

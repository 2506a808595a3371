//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::artifact::PackageFormat;
use crate::config::KindlingConfig;

/// Kindling - provision a Rust toolchain, then build and deploy the project.
#[derive(Debug, Parser)]
#[command(name = "kindling")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default kindling.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision, build, deploy and register (default if no command specified)
    Run(RunArgs),

    /// Run the full pipeline, then build a distribution package
    Package(PackageArgs),

    /// Probe the toolchain and show the provisioning decision
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Minimum acceptable compiler version
    #[arg(long, value_name = "VERSION")]
    pub required_version: Option<String>,

    /// Repository to register the installed binary in
    #[arg(long, value_name = "DIR")]
    pub register_repo: Option<PathBuf>,

    /// Provision the toolchain only
    #[arg(long)]
    pub skip_build: bool,

    /// Probe and report the decision without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not consult the system package repository
    #[arg(long)]
    pub offline: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut KindlingConfig) {
        if let Some(version) = &self.required_version {
            config.toolchain.required_version = version.clone();
        }
        if let Some(repo) = &self.register_repo {
            config.artifact.register.repository = Some(repo.clone());
        }
    }
}

/// Arguments for the `package` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PackageArgs {
    /// Package format to build
    #[arg(value_enum)]
    pub format: PackageFormat,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Emit the probe result and decision as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip the repository probe (no package index refresh)
    #[arg(long)]
    pub offline: bool,

    /// Minimum acceptable compiler version
    #[arg(long, value_name = "VERSION")]
    pub required_version: Option<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

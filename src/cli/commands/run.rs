//! Run command implementation.
//!
//! `kindling run` (and `kindling package <format>`) drive the full pipeline.

use std::path::{Path, PathBuf};

use crate::artifact::PackageFormat;
use crate::cli::args::RunArgs;
use crate::config::{load_config, validate, KindlingConfig};
use crate::error::Result;
use crate::runner::{Orchestrator, RunOptions};
use crate::shell::{CommandRunner, SystemRunner};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: RunArgs,
    package: Option<PackageFormat>,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
            package: None,
        }
    }

    /// Build a distribution package after deploying.
    pub fn with_package(mut self, format: PackageFormat) -> Self {
        self.package = Some(format);
        self
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Load configuration and apply command-line overrides.
    fn load(&self) -> Result<KindlingConfig> {
        let mut config = load_config(&self.project_root, self.config_path.as_deref())?;
        self.args.apply(&mut config);
        validate(&config, &self.project_root)?;
        Ok(config)
    }

    fn build_options(&self) -> RunOptions {
        RunOptions {
            skip_build: self.args.skip_build,
            dry_run: self.args.dry_run,
            offline: self.args.offline,
            package: self.package,
        }
    }

    /// Execute against a specific command runner.
    pub fn run_with(&self, runner: &dyn CommandRunner, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.load()?;

        let name = config
            .artifact
            .binary_name(&self.project_root)
            .unwrap_or_else(|| "project".to_string());
        ui.show_header(&format!("Provisioning {}", name));

        if self.args.dry_run {
            ui.message("Dry run: nothing will be installed, built or deployed");
        }

        let orchestrator = Orchestrator::new(&config, &self.project_root, runner);
        orchestrator.run(&self.build_options(), ui)?;

        Ok(CommandResult::success())
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.run_with(&SystemRunner::new(), ui)
    }
}

//! Check command implementation.
//!
//! `kindling check` probes the machine and prints the provisioning decision
//! without changing anything.

use std::path::{Path, PathBuf};

use crate::cli::args::CheckArgs;
use crate::config::{load_config, validate};
use crate::error::{KindlingError, Result};
use crate::runner::Orchestrator;
use crate::shell::{CommandRunner, SystemRunner};
use crate::toolchain::{ProvisionReport, RepositoryProbe, SystemPackageManager};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: CheckArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }

    /// Probe and decide against a specific command runner.
    pub fn report(&self, runner: &dyn CommandRunner) -> Result<ProvisionReport> {
        let mut config = load_config(&self.project_root, self.config_path.as_deref())?;
        if let Some(version) = &self.args.required_version {
            config.toolchain.required_version = version.clone();
        }
        validate(&config, &self.project_root)?;

        Orchestrator::new(&config, &self.project_root, runner).check(!self.args.offline)
    }

    /// Execute against a specific command runner.
    pub fn run_with(&self, runner: &dyn CommandRunner, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = self.report(runner)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| KindlingError::Other(e.into()))?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        show_report(&report, ui);
        Ok(CommandResult::success())
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.run_with(&SystemRunner::new(), ui)
    }
}

fn show_report(report: &ProvisionReport, ui: &mut dyn UserInterface) {
    let probe = &report.probe;
    ui.show_header("Toolchain check");

    ui.message(&format!("  Required:        {}", report.required_version));
    ui.message(&format!(
        "  Installed:       {}",
        probe
            .installed_version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    ui.message(&format!("  Manager present: {}", yes_no(probe.manager_present)));
    ui.message(&format!(
        "  Package manager: {}",
        if probe.package_manager_present {
            SystemPackageManager::NAME
        } else {
            "none"
        }
    ));

    let repository = match &probe.repository {
        RepositoryProbe::NotProbed => "not probed".to_string(),
        RepositoryProbe::Missing => "package not found".to_string(),
        RepositoryProbe::Candidate { version } => format!("candidate {}", version),
        RepositoryProbe::Failed { message } => {
            ui.warning(message);
            "probe failed".to_string()
        }
    };
    ui.message(&format!("  Repository:      {}", repository));

    ui.success(&format!(
        "Decision: {} ({})",
        report.decision.strategy, report.decision.reason
    ));
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

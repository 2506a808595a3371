//! Provisioning pipeline orchestration.
//!
//! Stages run strictly in order: provision, build, deploy, register, and
//! optionally package. The first fatal failure aborts the run; nothing that
//! already happened is rolled back.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifact::{
    build_release, deploy, package, register, release_binary, DeployPlan, PackageFormat,
    RegisterOutcome,
};
use crate::config::KindlingConfig;
use crate::error::{KindlingError, Result};
use crate::shell::CommandRunner;
use crate::toolchain::{
    meets_minimum, select_strategy, InstallExecutor, ProvisionReport, RepositoryProbe, Strategy,
    SystemPackageManager, ToolchainProbe,
};
use crate::ui::{RunSummary, StageResult, StageStatus, UserInterface};

/// Options for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Provision only; skip build, deploy, register and package.
    pub skip_build: bool,
    /// Probe and decide, change nothing.
    pub dry_run: bool,
    /// Do not consult the system package repository.
    pub offline: bool,
    /// Build a distribution package at the end.
    pub package: Option<PackageFormat>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub provision: ProvisionReport,
    pub summary: RunSummary,
}

/// Sequences toolchain provisioning and the build/deploy collaborators.
pub struct Orchestrator<'a> {
    config: &'a KindlingConfig,
    project_root: PathBuf,
    runner: &'a dyn CommandRunner,
    package_manager: Option<Option<SystemPackageManager>>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a KindlingConfig, project_root: &Path, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            project_root: project_root.to_path_buf(),
            runner,
            package_manager: None,
        }
    }

    /// Use this package manager instead of detecting one.
    pub fn with_package_manager(mut self, package_manager: Option<SystemPackageManager>) -> Self {
        self.package_manager = Some(package_manager);
        self
    }

    fn package_manager(&self) -> Option<SystemPackageManager> {
        match &self.package_manager {
            Some(pm) => pm.clone(),
            None => SystemPackageManager::detect(self.runner),
        }
    }

    /// Probe the machine and decide, without installing anything.
    ///
    /// With `allow_repository` the package index is refreshed to read the
    /// repository candidate.
    pub fn check(&self, allow_repository: bool) -> Result<ProvisionReport> {
        let settings = &self.config.toolchain;
        let required = settings.required()?;
        let pm = self.package_manager();

        let probe = ToolchainProbe::new(self.runner, settings).probe(pm.as_ref(), &required, allow_repository);
        let decision = select_strategy(&probe, &required);
        tracing::info!(strategy = %decision.strategy, reason = %decision.reason, "strategy selected");

        Ok(ProvisionReport {
            required_version: required,
            probe,
            decision,
            attempts: Vec::new(),
            final_version: None,
        })
    }

    /// Make sure a sufficient toolchain is installed.
    ///
    /// # Errors
    ///
    /// Any fatal probe, acquisition or initialization failure, or a compiler
    /// that still misses the minimum once the install has finished.
    pub fn provision(&self, allow_repository: bool, ui: &mut dyn UserInterface) -> Result<ProvisionReport> {
        let settings = &self.config.toolchain;
        let mut spinner = ui.start_spinner("Probing toolchain");
        let mut report = self.check(allow_repository)?;
        spinner.finish_success(&describe_installed(&report));
        report_repository(&report, ui);

        if report.decision.strategy == Strategy::Skip {
            ui.success(&report.decision.reason);
            return Ok(report);
        }

        ui.message(&format!(
            "Provisioning via {} ({})",
            report.decision.strategy, report.decision.reason
        ));

        let pm = self.package_manager();
        let mut executor = InstallExecutor::new(self.runner, settings, pm.as_ref());
        let result = executor.execute(report.decision.strategy);
        report.attempts = executor.into_attempts();
        show_attempts(&report, ui);
        let outcome = result?;
        ui.success(&outcome.diagnostic);

        let probe = ToolchainProbe::new(self.runner, settings);
        report.final_version = probe.detect_installed();
        if !meets_minimum(report.final_version.as_ref(), &report.required_version) {
            let found = report
                .final_version
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "no version".to_string());
            ui.show_hint("Check that ~/.cargo/bin comes before the system compiler on PATH");
            return Err(KindlingError::AcquisitionFailed {
                message: format!(
                    "{} reports {} after install, minimum is {}",
                    settings.compiler, found, report.required_version
                ),
            });
        }

        Ok(report)
    }

    /// Run the whole pipeline and render its summary.
    ///
    /// The summary is shown on failure too, with the failing stage marked.
    pub fn run(&self, options: &RunOptions, ui: &mut dyn UserInterface) -> Result<RunResult> {
        let start = Instant::now();
        let mut stages = Vec::new();

        let outcome = if options.dry_run {
            self.plan(options, ui, &mut stages)
        } else {
            self.run_stages(options, ui, &mut stages)
        };

        let summary = RunSummary {
            stage_results: stages,
            total_duration: start.elapsed(),
            success: outcome.is_ok(),
        };
        ui.show_run_summary(&summary);

        outcome.map(|provision| RunResult { provision, summary })
    }

    fn plan(
        &self,
        options: &RunOptions,
        ui: &mut dyn UserInterface,
        stages: &mut Vec<StageResult>,
    ) -> Result<ProvisionReport> {
        let provision = self.check(!options.offline)?;
        report_repository(&provision, ui);
        ui.message(&format!(
            "Would provision via {} ({})",
            provision.decision.strategy, provision.decision.reason
        ));

        stages.push(StageResult::new(
            "provision",
            StageStatus::Skipped,
            format!("dry run: would {}", provision.decision.strategy),
        ));
        if !options.skip_build {
            for name in ["build", "deploy", "register"] {
                stages.push(StageResult::new(name, StageStatus::Skipped, "dry run"));
            }
            if let Some(format) = options.package {
                stages.push(StageResult::new("package", StageStatus::Skipped, format!("dry run: {}", format)));
            }
        }
        Ok(provision)
    }

    fn run_stages(
        &self,
        options: &RunOptions,
        ui: &mut dyn UserInterface,
        stages: &mut Vec<StageResult>,
    ) -> Result<ProvisionReport> {
        let provision = self
            .provision(!options.offline, ui)
            .inspect_err(|e| stages.push(failed("provision", e)))?;
        stages.push(StageResult::new(
            "provision",
            StageStatus::Completed,
            provision.decision.strategy.to_string(),
        ));

        if options.skip_build {
            stages.push(StageResult::new("build", StageStatus::Skipped, "--skip-build"));
            return Ok(provision);
        }

        self.build_and_deploy(options, ui, stages)?;
        Ok(provision)
    }

    fn build_and_deploy(
        &self,
        options: &RunOptions,
        ui: &mut dyn UserInterface,
        stages: &mut Vec<StageResult>,
    ) -> Result<()> {
        let artifact = &self.config.artifact;
        let binary = artifact
            .binary_name(&self.project_root)
            .ok_or_else(|| KindlingError::ConfigValidationError {
                message: "could not determine the binary name; set artifact.binary".to_string(),
            })
            .inspect_err(|e| stages.push(failed("build", e)))?;

        let mut spinner = ui.start_spinner("Building release");
        if let Err(e) = build_release(self.runner, &self.project_root) {
            spinner.finish_error("Build failed");
            stages.push(failed("build", &e));
            return Err(e);
        }
        spinner.finish_success("Built release");
        stages.push(StageResult::new("build", StageStatus::Completed, "release"));

        let plan = DeployPlan::new(
            artifact,
            &self.project_root,
            release_binary(&self.project_root, &binary),
            &binary,
        );
        let deployed = deploy(&plan).inspect_err(|e| stages.push(failed("deploy", e)))?;
        for skipped in &deployed.skipped {
            ui.warning(&format!("Completion script not found: {}", skipped.display()));
        }
        ui.success(&format!("Installed {}", deployed.binary.display()));
        stages.push(StageResult::new(
            "deploy",
            StageStatus::Completed,
            format!("{} + {} completions", binary, deployed.completions.len()),
        ));

        let registered = register(self.runner, &deployed.binary, &artifact.register)
            .inspect_err(|e| stages.push(failed("register", e)))?;
        match registered {
            RegisterOutcome::Registered { repository } => {
                ui.success(&format!("Registered in {}", repository.display()));
                stages.push(StageResult::new(
                    "register",
                    StageStatus::Completed,
                    repository.display().to_string(),
                ));
            }
            RegisterOutcome::Skipped { reason } => {
                ui.show_hint("Set artifact.register.repository or pass --register-repo to register");
                stages.push(StageResult::new("register", StageStatus::Skipped, reason));
            }
        }

        if let Some(format) = options.package {
            let mut spinner = ui.start_spinner(&format!("Packaging {}", format));
            if let Err(e) = package(self.runner, format, &self.project_root) {
                spinner.finish_error(&format!("Packaging {} failed", format));
                stages.push(failed("package", &e));
                return Err(e);
            }
            spinner.finish_success(&format!("Packaged {}", format));
            stages.push(StageResult::new("package", StageStatus::Completed, format.to_string()));
        }

        Ok(())
    }
}

fn failed(stage: &str, err: &KindlingError) -> StageResult {
    StageResult::new(stage, StageStatus::Failed, err.to_string())
}

fn describe_installed(report: &ProvisionReport) -> String {
    match &report.probe.installed_version {
        Some(version) => format!("Found toolchain {}", version),
        None => "No toolchain found".to_string(),
    }
}

fn report_repository(report: &ProvisionReport, ui: &mut dyn UserInterface) {
    if let RepositoryProbe::Failed { message } = &report.probe.repository {
        ui.warning(message);
    }
}

fn show_attempts(report: &ProvisionReport, ui: &mut dyn UserInterface) {
    if ui.output_mode().shows_details() {
        for attempt in report.attempts.iter().filter(|a| a.success) {
            ui.message(&format!("  {}", attempt));
        }
    }
    for attempt in report.warnings() {
        ui.warning(&attempt.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use crate::ui::{MockUI, OutputMode};
    use std::fs;
    use tempfile::TempDir;

    const RUSTC_OLD: &str = "rustc 1.65.0 (897e37553 2022-11-02)";
    const RUSTC_NEW: &str = "rustc 1.75.0 (82e1608df 2023-12-21)";

    struct Fixture {
        temp: TempDir,
        config: KindlingConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let project = temp.path().join("cmt");
            fs::create_dir_all(project.join("target/release")).unwrap();
            fs::write(project.join("target/release/cmt"), "bin").unwrap();

            let mut config = KindlingConfig::default();
            config.artifact.bin_dir = Some(temp.path().join("bin"));
            config.artifact.completions = Some(vec![]);
            Self { temp, config }
        }

        fn project(&self) -> PathBuf {
            self.temp.path().join("cmt")
        }
    }

    fn satisfied_runner() -> MockRunner {
        MockRunner::new()
            .with_program("rustc")
            .with_output("rustc --version", RUSTC_NEW)
    }

    #[test]
    fn satisfied_toolchain_is_idempotent() {
        let fixture = Fixture::new();
        let runner = satisfied_runner();
        let mut ui = MockUI::new();
        let orchestrator = Orchestrator::new(&fixture.config, &fixture.project(), &runner)
            .with_package_manager(Some(SystemPackageManager::apt(false)));

        for _ in 0..2 {
            let result = orchestrator.run(&RunOptions::default(), &mut ui).unwrap();
            assert_eq!(result.provision.decision.strategy, Strategy::Skip);
            assert!(!result.provision.changed_system());
        }

        assert!(runner.calls().iter().all(|c| !c.contains("apt-get") && !c.starts_with("rustup")));
        assert_eq!(runner.run_count("cargo build --release"), 2);
        assert!(fixture.temp.path().join("bin/cmt").is_file());
    }

    #[test]
    fn package_manager_install_scenario() {
        let fixture = Fixture::new();
        let runner = MockRunner::new()
            .with_output("apt-cache policy rustc", "rustc:\n  Candidate: 1.72.0-ubuntu1\n")
            .with_output("rustc --version", "rustc 1.72.0")
            .provides("apt-get install -y rustc cargo", "rustc");
        let mut ui = MockUI::new();
        let orchestrator = Orchestrator::new(&fixture.config, &fixture.project(), &runner)
            .with_package_manager(Some(SystemPackageManager::apt(false)));

        let report = orchestrator.provision(true, &mut ui).unwrap();
        assert_eq!(report.decision.strategy, Strategy::PackageManagerInstall);
        assert_eq!(report.final_version.unwrap().as_str(), "1.72.0");
        assert!(!runner.ran("apt-get install -y rustup"));
        assert!(ui.warnings().is_empty());
        assert!(!ui.has_message("[ok]"));
    }

    #[test]
    fn verbose_mode_lists_successful_attempts() {
        let fixture = Fixture::new();
        let runner = MockRunner::new()
            .with_output("apt-cache policy rustc", "rustc:\n  Candidate: 1.72.0-ubuntu1\n")
            .with_output("rustc --version", "rustc 1.72.0")
            .provides("apt-get install -y rustc cargo", "rustc");
        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        let orchestrator = Orchestrator::new(&fixture.config, &fixture.project(), &runner)
            .with_package_manager(Some(SystemPackageManager::apt(false)));

        orchestrator.provision(true, &mut ui).unwrap();
        assert!(ui.has_message("[ok]"));
    }

    #[test]
    fn old_toolchain_without_package_manager_uses_rustup() {
        let fixture = Fixture::new();
        let runner = MockRunner::new()
            .with_program("rustc")
            .with_program("rustup")
            .with_sequence(
                "rustc --version",
                vec![crate::shell::CommandResult::success(
                    RUSTC_OLD.to_string(),
                    String::new(),
                    std::time::Duration::ZERO,
                )],
            )
            .with_output("rustc --version", RUSTC_NEW);
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);

        let report = orchestrator.provision(true, &mut ui).unwrap();
        assert_eq!(report.probe.installed_version.as_ref().unwrap().as_str(), "1.65.0");
        assert_eq!(report.decision.strategy, Strategy::ToolchainManagerInstall);
        assert!(runner.ran("rustup toolchain install stable --no-self-update"));
        assert!(runner.ran("rustup default stable"));
        assert_eq!(report.final_version.unwrap().as_str(), "1.75.0");
    }

    #[test]
    fn repository_failure_warns_and_uses_rustup() {
        let fixture = Fixture::new();
        let runner = MockRunner::new()
            .with_program("rustup")
            .with_failure("apt-get update", "E: Could not get lock")
            .provides("rustup default stable", "rustc")
            .with_output("rustc --version", RUSTC_NEW);
        let mut ui = MockUI::new();
        let orchestrator = Orchestrator::new(&fixture.config, &fixture.project(), &runner)
            .with_package_manager(Some(SystemPackageManager::apt(false)));

        let report = orchestrator.provision(true, &mut ui).unwrap();
        assert_eq!(report.decision.strategy, Strategy::ToolchainManagerInstall);
        assert!(ui.has_warning("Could not get lock"));
        assert!(runner.ran("rustup default stable"));
    }

    #[test]
    fn missing_compiler_after_install_is_fatal() {
        let fixture = Fixture::new();
        let runner = MockRunner::new().with_program("rustup");
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);

        let err = orchestrator.run(&RunOptions::default(), &mut ui).unwrap_err();
        assert!(matches!(err, KindlingError::AcquisitionFailed { .. }));
        assert!(err.to_string().contains("no version"));
        assert!(!runner.ran("cargo build --release"));
    }

    #[test]
    fn stale_compiler_after_install_never_builds() {
        let fixture = Fixture::new();
        let runner = MockRunner::new()
            .with_program("rustc")
            .with_program("rustup")
            .with_output("rustc --version", RUSTC_OLD);
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);

        let err = orchestrator.run(&RunOptions::default(), &mut ui).unwrap_err();
        assert!(matches!(err, KindlingError::AcquisitionFailed { .. }));
        assert!(err.to_string().contains("1.65.0"));
        assert!(runner.ran("rustup default stable"));
        assert!(!runner.ran("cargo build --release"));
        assert!(!fixture.temp.path().join("bin/cmt").exists());
        assert!(ui.has_hint("~/.cargo/bin"));

        let summary = &ui.summaries()[0];
        assert!(!summary.success);
        assert_eq!(summary.status_of("provision"), Some(StageStatus::Failed));
        assert_eq!(summary.status_of("build"), None);
    }

    #[test]
    fn build_failure_aborts_before_deploy() {
        let fixture = Fixture::new();
        let runner = satisfied_runner().with_failure("cargo build --release", "error: could not compile");
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);

        let err = orchestrator.run(&RunOptions::default(), &mut ui).unwrap_err();
        assert!(matches!(err, KindlingError::BuildFailed { .. }));
        assert!(!fixture.temp.path().join("bin/cmt").exists());

        let summary = &ui.summaries()[0];
        assert!(!summary.success);
        assert_eq!(summary.status_of("provision"), Some(StageStatus::Completed));
        assert_eq!(summary.status_of("build"), Some(StageStatus::Failed));
        assert_eq!(summary.status_of("deploy"), None);
    }

    #[test]
    fn fatal_provisioning_stops_the_pipeline() {
        let fixture = Fixture::new();
        let runner = MockRunner::new()
            .with_program("rustup")
            .with_failure("rustup default stable", "error: toolchain 'stable' is not installed");
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);

        let err = orchestrator.run(&RunOptions::default(), &mut ui).unwrap_err();
        assert!(matches!(err, KindlingError::InitializationFailed { .. }));
        assert!(!runner.ran("cargo build --release"));
        assert_eq!(ui.summaries()[0].status_of("provision"), Some(StageStatus::Failed));
        assert!(ui.has_warning("set default toolchain [failed]"));
    }

    #[test]
    fn dry_run_changes_nothing() {
        let fixture = Fixture::new();
        let runner = MockRunner::new();
        let mut ui = MockUI::new();
        let orchestrator = Orchestrator::new(&fixture.config, &fixture.project(), &runner)
            .with_package_manager(Some(SystemPackageManager::apt(false)));
        let options = RunOptions {
            dry_run: true,
            offline: true,
            package: Some(PackageFormat::Deb),
            ..Default::default()
        };

        let result = orchestrator.run(&options, &mut ui).unwrap();
        assert!(runner.calls().is_empty());
        assert_eq!(result.summary.stages_skipped(), 5);
        assert!(ui.has_message("Would provision via toolchain manager install"));
    }

    #[test]
    fn skip_build_provisions_only() {
        let fixture = Fixture::new();
        let runner = satisfied_runner();
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);
        let options = RunOptions {
            skip_build: true,
            ..Default::default()
        };

        let result = orchestrator.run(&options, &mut ui).unwrap();
        assert_eq!(result.summary.status_of("build"), Some(StageStatus::Skipped));
        assert!(!runner.ran("cargo build --release"));
    }

    #[test]
    fn registers_into_configured_repository() {
        let mut fixture = Fixture::new();
        let repo = fixture.temp.path().join("repo");
        fs::create_dir_all(&repo).unwrap();
        fixture.config.artifact.register.repository = Some(repo.clone());
        let runner = satisfied_runner();
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);

        let result = orchestrator.run(&RunOptions::default(), &mut ui).unwrap();
        let installed = fixture.temp.path().join("bin/cmt");
        assert!(runner.ran(&format!("{} install --force", installed.display())));
        assert_eq!(result.summary.status_of("register"), Some(StageStatus::Completed));
    }

    #[test]
    fn unregistered_run_shows_hint() {
        let fixture = Fixture::new();
        let runner = satisfied_runner();
        let mut ui = MockUI::new();
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);

        let result = orchestrator.run(&RunOptions::default(), &mut ui).unwrap();
        assert_eq!(result.summary.status_of("register"), Some(StageStatus::Skipped));
        assert!(ui.has_hint("--register-repo"));
    }

    #[test]
    fn packaging_runs_last() {
        let fixture = Fixture::new();
        let runner = satisfied_runner().with_program("cargo-deb");
        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        let orchestrator =
            Orchestrator::new(&fixture.config, &fixture.project(), &runner).with_package_manager(None);
        let options = RunOptions {
            package: Some(PackageFormat::Deb),
            ..Default::default()
        };

        let result = orchestrator.run(&options, &mut ui).unwrap();
        assert_eq!(runner.calls().last().unwrap(), "cargo deb");
        assert_eq!(result.summary.status_of("package"), Some(StageStatus::Completed));
    }
}

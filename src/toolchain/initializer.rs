//! ToolchainInitializer: bring a present toolchain manager to a usable default.
//!
//! Stages run in a fixed order. Fatal stages abort on failure; best-effort
//! stages record a failed outcome, log a warning and move on.

use std::fmt;

use crate::config::ToolchainSettings;
use crate::error::{KindlingError, Result};
use crate::shell::{CommandRunner, Invocation};

use super::status::AttemptOutcome;

/// One stage of toolchain initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    VerifyManagerAvailable,
    ShowDiagnostics,
    InstallDefaultToolchain,
    SetDefaultToolchain,
    VerifyFinal,
}

impl InitStage {
    /// All stages in execution order.
    pub const SEQUENCE: [InitStage; 5] = [
        InitStage::VerifyManagerAvailable,
        InitStage::ShowDiagnostics,
        InitStage::InstallDefaultToolchain,
        InitStage::SetDefaultToolchain,
        InitStage::VerifyFinal,
    ];

    /// Whether failure aborts the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InitStage::VerifyManagerAvailable
                | InitStage::InstallDefaultToolchain
                | InitStage::SetDefaultToolchain
        )
    }

    /// The command this stage runs.
    pub fn invocation(&self, settings: &ToolchainSettings) -> Invocation {
        let manager = Invocation::new(&settings.manager);
        match self {
            InitStage::VerifyManagerAvailable => manager.arg("--version"),
            InitStage::ShowDiagnostics => manager.args(["toolchain", "list"]),
            InitStage::InstallDefaultToolchain => manager
                .args(["toolchain", "install"])
                .arg(&settings.channel)
                .arg("--no-self-update")
                .streaming(),
            InitStage::SetDefaultToolchain => manager.arg("default").arg(&settings.channel),
            InitStage::VerifyFinal => manager.arg("show"),
        }
    }
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::VerifyManagerAvailable => "verify manager",
            InitStage::ShowDiagnostics => "list toolchains",
            InitStage::InstallDefaultToolchain => "install default toolchain",
            InitStage::SetDefaultToolchain => "set default toolchain",
            InitStage::VerifyFinal => "show toolchain status",
        };
        f.write_str(name)
    }
}

/// Runs the initialization stages against a toolchain manager.
pub struct ToolchainInitializer<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a ToolchainSettings,
}

impl<'a> ToolchainInitializer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a ToolchainSettings) -> Self {
        Self { runner, settings }
    }

    /// Run every stage, appending one outcome per stage to `record`.
    ///
    /// # Errors
    ///
    /// `InitializationFailed` from the first fatal stage that fails; later
    /// stages do not run.
    pub fn run(&self, record: &mut Vec<AttemptOutcome>) -> Result<()> {
        for stage in InitStage::SEQUENCE {
            let outcome = self.run_stage(stage);
            tracing::debug!(stage = %stage, success = outcome.success, "initializer stage");

            if outcome.success {
                record.push(outcome);
                continue;
            }

            if stage.is_fatal() {
                let err = KindlingError::InitializationFailed {
                    stage: stage.to_string(),
                    message: outcome.diagnostic.clone(),
                };
                record.push(outcome);
                return Err(err);
            }

            tracing::warn!(stage = %stage, "{}", outcome.diagnostic);
            record.push(outcome);
        }
        Ok(())
    }

    fn run_stage(&self, stage: InitStage) -> AttemptOutcome {
        let invocation = stage.invocation(self.settings);
        match self.runner.run(&invocation) {
            Ok(result) => AttemptOutcome::from_result(stage.to_string(), &result),
            Err(e) => AttemptOutcome::failed(stage.to_string(), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;

    fn run(runner: &MockRunner) -> (Result<()>, Vec<AttemptOutcome>) {
        let settings = ToolchainSettings::default();
        let mut record = Vec::new();
        let result = ToolchainInitializer::new(runner, &settings).run(&mut record);
        (result, record)
    }

    #[test]
    fn stages_run_in_order() {
        let runner = MockRunner::new();
        let (result, record) = run(&runner);

        assert!(result.is_ok());
        assert_eq!(record.len(), 5);
        assert_eq!(
            runner.calls(),
            vec![
                "rustup --version",
                "rustup toolchain list",
                "rustup toolchain install stable --no-self-update",
                "rustup default stable",
                "rustup show",
            ]
        );
    }

    #[test]
    fn unavailable_manager_is_fatal() {
        let runner = MockRunner::new().with_unspawnable("rustup");
        let (result, record) = run(&runner);

        match result.unwrap_err() {
            KindlingError::InitializationFailed { stage, .. } => {
                assert_eq!(stage, "verify manager")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(record.len(), 1);
        assert_eq!(runner.run_count("rustup toolchain list"), 0);
    }

    #[test]
    fn diagnostics_failures_are_not_fatal() {
        let runner = MockRunner::new()
            .with_failure("rustup toolchain list", "error: could not read toolchains")
            .with_failure("rustup show", "error: no active toolchain");
        let (result, record) = run(&runner);

        assert!(result.is_ok());
        assert_eq!(record.iter().filter(|o| !o.success).count(), 2);
        assert!(runner.ran("rustup default stable"));
    }

    #[test]
    fn install_failure_aborts_before_set_default() {
        let runner = MockRunner::new().with_failure(
            "rustup toolchain install stable --no-self-update",
            "error: could not download",
        );
        let (result, record) = run(&runner);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("install default toolchain"));
        assert!(err.to_string().contains("could not download"));
        assert!(!runner.ran("rustup default stable"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn set_default_failure_is_fatal() {
        let runner = MockRunner::new().with_failure("rustup default stable", "error: toolchain missing");
        let (result, _) = run(&runner);

        assert!(result.is_err());
        assert!(!runner.ran("rustup show"));
    }

    #[test]
    fn channel_comes_from_settings() {
        let settings = ToolchainSettings {
            channel: "1.79.0".to_string(),
            ..Default::default()
        };
        assert_eq!(
            InitStage::SetDefaultToolchain.invocation(&settings).command_line(),
            "rustup default 1.79.0"
        );
    }
}

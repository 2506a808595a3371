//! InstallExecutor: carry out the selected strategy.

use crate::config::ToolchainSettings;
use crate::error::{KindlingError, Result};
use crate::shell::CommandRunner;

use super::acquisition::AcquisitionPlan;
use super::initializer::ToolchainInitializer;
use super::package_manager::SystemPackageManager;
use super::status::{AttemptOutcome, Strategy};

/// Executes one provisioning strategy and records every step it takes.
///
/// A failed strategy is never retried with the other one.
pub struct InstallExecutor<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a ToolchainSettings,
    package_manager: Option<&'a SystemPackageManager>,
    attempts: Vec<AttemptOutcome>,
}

impl<'a> InstallExecutor<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        settings: &'a ToolchainSettings,
        package_manager: Option<&'a SystemPackageManager>,
    ) -> Self {
        Self {
            runner,
            settings,
            package_manager,
            attempts: Vec::new(),
        }
    }

    /// Run a strategy. `Skip` does nothing.
    pub fn execute(&mut self, strategy: Strategy) -> Result<AttemptOutcome> {
        match strategy {
            Strategy::Skip => Ok(AttemptOutcome::succeeded(
                strategy.to_string(),
                "toolchain already satisfies the minimum",
            )),
            Strategy::PackageManagerInstall => self.run_package_manager_install(),
            Strategy::ToolchainManagerInstall => self.run_toolchain_manager_install(),
        }
    }

    /// Install the compiler and build tool packages in one invocation.
    ///
    /// # Errors
    ///
    /// `AcquisitionFailed` if there is no package manager or the install fails.
    pub fn run_package_manager_install(&mut self) -> Result<AttemptOutcome> {
        let pm = self
            .package_manager
            .ok_or_else(|| KindlingError::AcquisitionFailed {
                message: "no system package manager available".to_string(),
            })?;

        let packages = self.settings.packages();
        let action = format!("install {} with {}", packages.join(" "), SystemPackageManager::NAME);
        tracing::info!("{}", action);

        let outcome = match self.runner.run(&pm.install(&packages)) {
            Ok(result) => AttemptOutcome::from_result(action, &result),
            Err(e) => AttemptOutcome::failed(action, e.to_string()),
        };
        self.attempts.push(outcome.clone());

        if outcome.success {
            Ok(outcome)
        } else {
            Err(KindlingError::AcquisitionFailed {
                message: outcome.to_string(),
            })
        }
    }

    /// Acquire the toolchain manager if needed, then initialize it.
    ///
    /// # Errors
    ///
    /// `AcquisitionFailed` when no source yields the manager,
    /// `InitializationFailed` when a fatal initializer stage fails.
    pub fn run_toolchain_manager_install(&mut self) -> Result<AttemptOutcome> {
        let manager = self.settings.manager.as_str();

        if self.runner.is_available(manager) {
            tracing::debug!(manager, "toolchain manager already present");
        } else {
            AcquisitionPlan::new(self.package_manager, self.settings).acquire(
                self.runner,
                manager,
                &mut self.attempts,
            )?;
        }

        ToolchainInitializer::new(self.runner, self.settings).run(&mut self.attempts)?;

        Ok(AttemptOutcome::succeeded(
            Strategy::ToolchainManagerInstall.to_string(),
            format!("{} toolchain active via {}", self.settings.channel, manager),
        ))
    }

    /// Every step taken so far, in order.
    pub fn attempts(&self) -> &[AttemptOutcome] {
        &self.attempts
    }

    pub fn into_attempts(self) -> Vec<AttemptOutcome> {
        self.attempts
    }
}

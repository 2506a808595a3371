//! ToolchainProbe: what is installed, and what the repository offers.
//!
//! Probes always query the machine. A result from before an install step
//! says nothing about the machine after it.

use crate::config::ToolchainSettings;
use crate::error::{KindlingError, Result};
use crate::shell::{CommandRunner, Invocation};

use super::package_manager::SystemPackageManager;
use super::status::{ProbeResult, RepositoryProbe};
use super::version::{meets_minimum, ToolchainVersion};

/// Queries the installed toolchain and the system package repository.
pub struct ToolchainProbe<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a ToolchainSettings,
}

impl<'a> ToolchainProbe<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a ToolchainSettings) -> Self {
        Self { runner, settings }
    }

    /// Version of the compiler on the search path.
    ///
    /// Absent when the compiler is not found, fails to run, or prints
    /// nothing that looks like a version.
    pub fn detect_installed(&self) -> Option<ToolchainVersion> {
        let compiler = &self.settings.compiler;
        if !self.runner.is_available(compiler) {
            tracing::debug!(compiler = %compiler, "compiler not on search path");
            return None;
        }

        let result = match self.runner.run(&Invocation::new(compiler).arg("--version")) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(compiler = %compiler, error = %e, "version query failed");
                return None;
            }
        };
        if !result.success {
            tracing::debug!(compiler = %compiler, diagnostic = %result.diagnostic(), "version query failed");
            return None;
        }

        let version = ToolchainVersion::from_tool_output(&result.stdout);
        tracing::debug!(compiler = %compiler, version = ?version.as_ref().map(|v| v.as_str()), "installed version");
        version
    }

    /// Whether the toolchain manager is on the search path.
    pub fn manager_present(&self) -> bool {
        self.runner.is_available(&self.settings.manager)
    }

    /// Refresh the package index and read the compiler package candidate.
    ///
    /// # Errors
    ///
    /// `ProbeFailed` when the index refresh fails, the policy query fails,
    /// or the policy output has no parseable candidate.
    pub fn detect_repository_candidate(
        &self,
        package_manager: &SystemPackageManager,
    ) -> Result<RepositoryProbe> {
        let package = &self.settings.compiler_package;

        let refresh = package_manager.refresh_index();
        let result = self
            .runner
            .run(&refresh)
            .map_err(|e| probe_failed("package index refresh", e.to_string()))?;
        if !result.success {
            return Err(probe_failed("package index refresh", result.diagnostic()));
        }

        let show = self
            .runner
            .run(&package_manager.show(package))
            .map_err(|e| probe_failed("package lookup", e.to_string()))?;
        if !show.success {
            tracing::debug!(package = %package, "package not in repository index");
            return Ok(RepositoryProbe::Missing);
        }

        let policy = self
            .runner
            .run(&package_manager.policy(package))
            .map_err(|e| probe_failed("package policy", e.to_string()))?;
        if !policy.success {
            return Err(probe_failed("package policy", policy.diagnostic()));
        }

        let version = super::package_manager::parse_candidate(&policy.stdout)
            .map_err(|e| probe_failed("package policy", format!("{}: {}", package, e)))?;
        tracing::debug!(package = %package, candidate = %version, "repository candidate");
        Ok(RepositoryProbe::Candidate { version })
    }

    /// Probe the machine.
    ///
    /// The repository is consulted only when the installed version falls
    /// short, a package manager is present and `allow_repository` is set.
    /// A repository failure is recorded in the result, not returned.
    pub fn probe(
        &self,
        package_manager: Option<&SystemPackageManager>,
        required: &ToolchainVersion,
        allow_repository: bool,
    ) -> ProbeResult {
        let installed_version = self.detect_installed();
        let manager_present = self.manager_present();

        let repository = match package_manager {
            _ if meets_minimum(installed_version.as_ref(), required) => RepositoryProbe::NotProbed,
            None => RepositoryProbe::NotProbed,
            Some(_) if !allow_repository => RepositoryProbe::NotProbed,
            Some(pm) => match self.detect_repository_candidate(pm) {
                Ok(repository) => repository,
                Err(e) => {
                    tracing::warn!("{}", e);
                    RepositoryProbe::Failed {
                        message: e.to_string(),
                    }
                }
            },
        };

        ProbeResult {
            installed_version,
            manager_present,
            package_manager_present: package_manager.is_some(),
            repository,
        }
    }
}

fn probe_failed(probe: &str, message: String) -> KindlingError {
    KindlingError::ProbeFailed {
        probe: probe.to_string(),
        message,
    }
}

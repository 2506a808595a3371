//! Probe results, strategy decisions and attempt outcomes.
//!
//! Everything here is produced and consumed within a single run. Nothing is
//! persisted, and a `ProbeResult` is never reused after an install step.

use serde::Serialize;
use std::fmt;

use crate::shell::CommandResult;

use super::version::ToolchainVersion;

/// What the system package repository offers for the compiler package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RepositoryProbe {
    /// The repository was not consulted.
    NotProbed,

    /// The package is not in the index.
    Missing,

    /// The package is in the index with this candidate version.
    Candidate { version: ToolchainVersion },

    /// The repository could not be probed (index refresh or policy parse).
    Failed { message: String },
}

/// State of the machine as observed by one probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    /// Version reported by the installed compiler, if any.
    pub installed_version: Option<ToolchainVersion>,

    /// Whether the toolchain manager is on the search path.
    pub manager_present: bool,

    /// Whether a supported system package manager was detected.
    pub package_manager_present: bool,

    /// The repository candidate for the compiler package.
    pub repository: RepositoryProbe,
}

impl ProbeResult {
    /// The repository candidate version, when one was found and parsed.
    pub fn repo_version(&self) -> Option<&ToolchainVersion> {
        match &self.repository {
            RepositoryProbe::Candidate { version } => Some(version),
            _ => None,
        }
    }

    /// Whether the compiler package exists in the repository index.
    pub fn repo_package_found(&self) -> bool {
        matches!(self.repository, RepositoryProbe::Candidate { .. })
    }
}

/// How the toolchain gets provisioned this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// The installed toolchain already meets the minimum.
    Skip,

    /// Install the compiler and build tool from the system repository.
    PackageManagerInstall,

    /// Install through the toolchain manager, acquiring it first if needed.
    ToolchainManagerInstall,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Skip => "skip",
            Strategy::PackageManagerInstall => "package manager install",
            Strategy::ToolchainManagerInstall => "toolchain manager install",
        };
        f.write_str(name)
    }
}

/// A strategy with the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub strategy: Strategy,
    pub reason: String,
}

impl Decision {
    pub fn new(strategy: Strategy, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            reason: reason.into(),
        }
    }
}

/// The outcome of one external step, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptOutcome {
    /// What was attempted.
    pub action: String,

    /// Whether it succeeded.
    pub success: bool,

    /// Human-readable detail, always present.
    pub diagnostic: String,
}

impl AttemptOutcome {
    pub fn succeeded(action: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            success: true,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn failed(action: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            success: false,
            diagnostic: diagnostic.into(),
        }
    }

    /// Outcome of a finished command.
    pub fn from_result(action: impl Into<String>, result: &CommandResult) -> Self {
        Self {
            action: action.into(),
            success: result.success,
            diagnostic: result.diagnostic(),
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "ok" } else { "failed" };
        write!(f, "{} [{}]: {}", self.action, status, self.diagnostic)
    }
}

/// Everything the provisioning engine observed and did in one run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub required_version: ToolchainVersion,
    pub probe: ProbeResult,
    pub decision: Decision,
    pub attempts: Vec<AttemptOutcome>,

    /// Compiler version re-probed after installing, if an install ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_version: Option<ToolchainVersion>,
}

impl ProvisionReport {
    /// Whether any mutating step was executed.
    pub fn changed_system(&self) -> bool {
        self.decision.strategy != Strategy::Skip && !self.attempts.is_empty()
    }

    /// Failed steps that did not abort the run.
    pub fn warnings(&self) -> impl Iterator<Item = &AttemptOutcome> {
        self.attempts.iter().filter(|a| !a.success)
    }
}

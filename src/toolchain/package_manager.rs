//! System package manager commands and output parsing.
//!
//! Only Debian-family systems are recognized (`apt-get` + `apt-cache`).
//! Elsewhere the provisioning engine goes straight to the toolchain manager.

use regex::Regex;
use std::sync::LazyLock;

use crate::shell::{is_elevated, CommandRunner, Invocation};

use super::version::ToolchainVersion;

/// `Candidate: <token>` where the token ends at whitespace or a `-` suffix.
static CANDIDATE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Candidate:\s*([^\s-]+)").unwrap());

/// Why a candidate version could not be read from policy output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyParseError {
    /// No `Candidate:` line in the output.
    #[error("no 'Candidate:' line in package policy output")]
    MissingCandidate,

    /// The candidate token is not a version this tool understands.
    #[error("candidate '{0}' is not a recognizable version")]
    InvalidVersion(String),
}

/// Extract the candidate version from `apt-cache policy` output.
///
/// ```
/// use kindling::toolchain::package_manager::parse_candidate;
///
/// let output = "rustc:\n  Installed: (none)\n  Candidate: 1.72.0-ubuntu1\n";
/// assert_eq!(parse_candidate(output).unwrap().as_str(), "1.72.0");
/// ```
pub fn parse_candidate(policy_output: &str) -> Result<ToolchainVersion, PolicyParseError> {
    let token = CANDIDATE_LINE
        .captures(policy_output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(PolicyParseError::MissingCandidate)?;

    ToolchainVersion::parse(token).ok_or_else(|| PolicyParseError::InvalidVersion(token.into()))
}

/// The machine's system package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPackageManager {
    use_sudo: bool,
}

impl SystemPackageManager {
    /// Display name.
    pub const NAME: &'static str = "apt";

    /// An apt package manager, optionally escalating through `sudo`.
    pub fn apt(use_sudo: bool) -> Self {
        Self { use_sudo }
    }

    /// Detect a supported package manager on the search path.
    ///
    /// `sudo` is used when not running as root and it is available.
    pub fn detect(runner: &dyn CommandRunner) -> Option<Self> {
        if !(runner.is_available("apt-get") && runner.is_available("apt-cache")) {
            tracing::debug!("no supported system package manager found");
            return None;
        }
        let use_sudo = !is_elevated() && runner.is_available("sudo");
        tracing::debug!(use_sudo, "detected apt");
        Some(Self::apt(use_sudo))
    }

    fn apt_get<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.use_sudo {
            // sudo resets the environment, so the frontend goes on its command line
            Invocation::new("sudo")
                .arg("DEBIAN_FRONTEND=noninteractive")
                .arg("apt-get")
                .args(args)
        } else {
            Invocation::new("apt-get")
                .args(args)
                .env("DEBIAN_FRONTEND", "noninteractive")
        }
    }

    /// Refresh the package index.
    pub fn refresh_index(&self) -> Invocation {
        self.apt_get(["update"])
    }

    /// Query whether a package exists in the index.
    pub fn show(&self, package: &str) -> Invocation {
        Invocation::new("apt-cache").arg("show").arg(package)
    }

    /// Query the candidate version of a package.
    pub fn policy(&self, package: &str) -> Invocation {
        Invocation::new("apt-cache").arg("policy").arg(package)
    }

    /// Install packages non-interactively.
    pub fn install(&self, packages: &[String]) -> Invocation {
        self.apt_get(["install", "-y"])
            .args(packages.iter().cloned())
            .streaming()
    }
}

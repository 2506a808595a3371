//! StrategySelector: a pure mapping from probe results to a strategy.

use super::status::{Decision, ProbeResult, RepositoryProbe, Strategy};
use super::version::{meets_minimum, ToolchainVersion};

/// Choose how to provision the toolchain.
///
/// The system package manager is preferred only when its candidate meets the
/// minimum. Every other case, including a failed or skipped repository
/// probe, goes through the toolchain manager.
///
/// ```
/// use kindling::toolchain::{select_strategy, ProbeResult, RepositoryProbe, Strategy};
/// use kindling::toolchain::version::ToolchainVersion;
///
/// let probe = ProbeResult {
///     installed_version: ToolchainVersion::parse("1.65.0"),
///     manager_present: false,
///     package_manager_present: false,
///     repository: RepositoryProbe::NotProbed,
/// };
/// let required = ToolchainVersion::parse("1.70.0").unwrap();
/// assert_eq!(select_strategy(&probe, &required).strategy, Strategy::ToolchainManagerInstall);
/// ```
pub fn select_strategy(probe: &ProbeResult, required: &ToolchainVersion) -> Decision {
    if meets_minimum(probe.installed_version.as_ref(), required) {
        let installed = probe
            .installed_version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        return Decision::new(
            Strategy::Skip,
            format!("installed {} meets minimum {}", installed, required),
        );
    }

    if !probe.package_manager_present {
        return Decision::new(
            Strategy::ToolchainManagerInstall,
            "no supported system package manager",
        );
    }

    match &probe.repository {
        RepositoryProbe::Candidate { version } if version.satisfies(required) => Decision::new(
            Strategy::PackageManagerInstall,
            format!("repository candidate {} meets minimum {}", version, required),
        ),
        RepositoryProbe::Candidate { version } => Decision::new(
            Strategy::ToolchainManagerInstall,
            format!("repository candidate {} is below minimum {}", version, required),
        ),
        RepositoryProbe::Missing => Decision::new(
            Strategy::ToolchainManagerInstall,
            "compiler package not found in repository",
        ),
        RepositoryProbe::Failed { message } => Decision::new(
            Strategy::ToolchainManagerInstall,
            format!("repository probe failed: {}", message),
        ),
        RepositoryProbe::NotProbed => Decision::new(
            Strategy::ToolchainManagerInstall,
            "repository probe skipped",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ToolchainVersion {
        ToolchainVersion::parse(s).unwrap()
    }

    fn probe(
        installed: Option<&str>,
        package_manager_present: bool,
        repository: RepositoryProbe,
    ) -> ProbeResult {
        ProbeResult {
            installed_version: installed.map(v),
            manager_present: false,
            package_manager_present,
            repository,
        }
    }

    fn candidate(s: &str) -> RepositoryProbe {
        RepositoryProbe::Candidate { version: v(s) }
    }

    #[test]
    fn satisfied_install_is_skipped() {
        let decision = select_strategy(
            &probe(Some("1.75.0"), true, RepositoryProbe::NotProbed),
            &v("1.70.0"),
        );
        assert_eq!(decision.strategy, Strategy::Skip);

        let exact = select_strategy(&probe(Some("1.70"), false, RepositoryProbe::NotProbed), &v("1.70.0"));
        assert_eq!(exact.strategy, Strategy::Skip);
    }

    #[test]
    fn no_package_manager_always_uses_toolchain_manager() {
        for repository in [
            RepositoryProbe::NotProbed,
            RepositoryProbe::Missing,
            candidate("1.80.0"),
            RepositoryProbe::Failed {
                message: "x".into(),
            },
        ] {
            for installed in [None, Some("1.65.0")] {
                let decision = select_strategy(&probe(installed, false, repository.clone()), &v("1.70.0"));
                assert_eq!(decision.strategy, Strategy::ToolchainManagerInstall);
            }
        }
    }

    #[test]
    fn sufficient_candidate_uses_package_manager() {
        let decision = select_strategy(&probe(None, true, candidate("1.72.0")), &v("1.70.0"));
        assert_eq!(decision.strategy, Strategy::PackageManagerInstall);
        assert!(decision.reason.contains("1.72.0"));
    }

    #[test]
    fn stale_candidate_uses_toolchain_manager() {
        let decision = select_strategy(&probe(Some("1.60.0"), true, candidate("1.66.0")), &v("1.70.0"));
        assert_eq!(decision.strategy, Strategy::ToolchainManagerInstall);
        assert!(decision.reason.contains("below minimum"));
    }

    #[test]
    fn failed_repository_probe_never_uses_package_manager() {
        let decision = select_strategy(
            &probe(
                None,
                true,
                RepositoryProbe::Failed {
                    message: "candidate '1:1.75.0' is not a recognizable version".into(),
                },
            ),
            &v("1.70.0"),
        );
        assert_eq!(decision.strategy, Strategy::ToolchainManagerInstall);
        assert!(decision.reason.starts_with("repository probe failed"));
    }

    #[test]
    fn missing_package_uses_toolchain_manager() {
        let decision = select_strategy(&probe(None, true, RepositoryProbe::Missing), &v("1.70.0"));
        assert_eq!(decision.strategy, Strategy::ToolchainManagerInstall);
    }
}

//! Acquiring the toolchain manager itself.
//!
//! Sources are tried in order until one produces a callable manager. A source
//! that fails hands over to the next one. Exhausting the readiness poll after
//! a package install is fatal and does not fall through.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ToolchainSettings;
use crate::error::{KindlingError, Result};
use crate::shell::{CommandRunner, Invocation};

use super::package_manager::SystemPackageManager;
use super::status::AttemptOutcome;

/// Bounded re-checks for a program after an asynchronous install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPoll {
    pub attempts: u32,
    pub delay: Duration,
}

impl ReadinessPoll {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    pub fn from_settings(settings: &ToolchainSettings) -> Self {
        Self::new(settings.readiness_attempts, settings.readiness_delay())
    }

    /// Look the program up until it appears or the attempts run out.
    ///
    /// Pauses only between attempts.
    pub fn wait_for(&self, runner: &dyn CommandRunner, program: &str) -> Option<PathBuf> {
        for attempt in 1..=self.attempts {
            if let Some(path) = runner.locate(program) {
                tracing::debug!(program, attempt, path = %path.display(), "program ready");
                return Some(path);
            }
            tracing::debug!(program, attempt, max = self.attempts, "program not yet available");
            if attempt < self.attempts {
                runner.pause(self.delay);
            }
        }
        None
    }
}

/// Download tool for the network bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetcher {
    Curl,
    Wget,
}

impl Fetcher {
    /// Preference order.
    pub const ALL: [Fetcher; 2] = [Fetcher::Curl, Fetcher::Wget];

    pub fn program(&self) -> &'static str {
        match self {
            Fetcher::Curl => "curl",
            Fetcher::Wget => "wget",
        }
    }

    /// The first fetcher on the search path.
    pub fn select(runner: &dyn CommandRunner) -> Option<Fetcher> {
        Self::ALL
            .into_iter()
            .find(|f| runner.is_available(f.program()))
    }

    /// Download-and-run pipeline restricted to HTTPS and TLS 1.2+.
    pub fn bootstrap_script(&self, url: &str) -> String {
        let fetch = match self {
            Fetcher::Curl => format!(
                "curl --proto '=https' --tlsv1.2 --progress-bar -Sf '{}'",
                url
            ),
            Fetcher::Wget => format!(
                "wget --https-only --secure-protocol=TLSv1_2 -qO- '{}'",
                url
            ),
        };
        format!("{} | sh -s -- -y", fetch)
    }
}

/// One way of getting the toolchain manager onto the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionSource {
    /// Install the manager's system package.
    PackageManager {
        package_manager: SystemPackageManager,
        package: String,
    },

    /// Fetch and run the manager's bootstrap installer.
    NetworkBootstrap { url: String },
}

impl AcquisitionSource {
    pub fn describe(&self) -> String {
        match self {
            AcquisitionSource::PackageManager { package, .. } => {
                format!("install {} with {}", package, SystemPackageManager::NAME)
            }
            AcquisitionSource::NetworkBootstrap { url } => format!("bootstrap from {}", url),
        }
    }

    /// Try this source.
    ///
    /// A failed outcome means the next source may be tried. An error means
    /// acquisition cannot continue.
    pub fn acquire(
        &self,
        runner: &dyn CommandRunner,
        manager: &str,
        poll: &ReadinessPoll,
    ) -> Result<AttemptOutcome> {
        let action = self.describe();
        match self {
            AcquisitionSource::PackageManager {
                package_manager,
                package,
            } => {
                let install = package_manager.install(std::slice::from_ref(package));
                let result = match runner.run(&install) {
                    Ok(result) => result,
                    Err(e) => return Ok(AttemptOutcome::failed(action, e.to_string())),
                };
                if !result.success {
                    return Ok(AttemptOutcome::from_result(action, &result));
                }

                match poll.wait_for(runner, manager) {
                    Some(path) => Ok(AttemptOutcome::succeeded(
                        action,
                        format!("{} available at {}", manager, path.display()),
                    )),
                    None => Err(KindlingError::AcquisitionFailed {
                        message: format!(
                            "{} installed but {} not found on the search path after {} attempts",
                            package, manager, poll.attempts
                        ),
                    }),
                }
            }
            AcquisitionSource::NetworkBootstrap { url } => {
                let Some(fetcher) = Fetcher::select(runner) else {
                    return Ok(AttemptOutcome::failed(
                        action,
                        "neither curl nor wget is available",
                    ));
                };
                tracing::info!(fetcher = fetcher.program(), url = %url, "running bootstrap installer");

                let script = Invocation::shell(&fetcher.bootstrap_script(url)).streaming();
                let result = match runner.run(&script) {
                    Ok(result) => result,
                    Err(e) => return Ok(AttemptOutcome::failed(action, e.to_string())),
                };
                if !result.success {
                    return Ok(AttemptOutcome::from_result(action, &result));
                }

                match runner.locate(manager) {
                    Some(path) => Ok(AttemptOutcome::succeeded(
                        action,
                        format!("{} available at {}", manager, path.display()),
                    )),
                    None => Ok(AttemptOutcome::failed(
                        action,
                        format!("bootstrap finished but {} is not on the search path", manager),
                    )),
                }
            }
        }
    }
}

/// Ordered acquisition sources with their readiness poll.
#[derive(Debug, Clone)]
pub struct AcquisitionPlan {
    pub sources: Vec<AcquisitionSource>,
    pub poll: ReadinessPoll,
}

impl AcquisitionPlan {
    /// Package manager first (when present), then the network bootstrap.
    pub fn new(package_manager: Option<&SystemPackageManager>, settings: &ToolchainSettings) -> Self {
        let mut sources = Vec::new();
        if let Some(pm) = package_manager {
            sources.push(AcquisitionSource::PackageManager {
                package_manager: pm.clone(),
                package: settings.manager_package.clone(),
            });
        }
        sources.push(AcquisitionSource::NetworkBootstrap {
            url: settings.bootstrap_url.clone(),
        });

        Self {
            sources,
            poll: ReadinessPoll::from_settings(settings),
        }
    }

    /// Try each source until the manager is available.
    ///
    /// Every attempt is appended to `record`, including the one that failed
    /// fatally.
    pub fn acquire(
        &self,
        runner: &dyn CommandRunner,
        manager: &str,
        record: &mut Vec<AttemptOutcome>,
    ) -> Result<()> {
        let mut failures = Vec::new();

        for source in &self.sources {
            tracing::info!(source = %source.describe(), "acquiring {}", manager);
            match source.acquire(runner, manager, &self.poll) {
                Ok(outcome) if outcome.success => {
                    record.push(outcome);
                    return Ok(());
                }
                Ok(outcome) => {
                    tracing::warn!("{}", outcome);
                    failures.push(outcome.to_string());
                    record.push(outcome);
                }
                Err(e) => {
                    record.push(AttemptOutcome::failed(source.describe(), e.to_string()));
                    return Err(e);
                }
            }
        }

        Err(KindlingError::AcquisitionFailed {
            message: format!("every source failed: {}", failures.join("; ")),
        })
    }
}

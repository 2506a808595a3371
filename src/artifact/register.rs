//! Self-registration of the deployed binary into a working repository.

use std::path::{Path, PathBuf};

use crate::config::RegisterSettings;
use crate::error::{KindlingError, Result};
use crate::shell::{CommandRunner, Invocation};

/// Result of the registration stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered { repository: PathBuf },
    Skipped { reason: String },
}

/// The registration command, run from inside the repository.
pub fn register_invocation(binary: &Path, repository: &Path, args: &[String]) -> Invocation {
    Invocation::new(&binary.to_string_lossy())
        .args(args.iter().cloned())
        .current_dir(repository)
}

/// Run the deployed binary's own install command in the configured repository.
///
/// Skipped when no repository is configured.
///
/// # Errors
///
/// `DeployFailed` if the repository does not exist, `CommandFailed` if the
/// binary exits non-zero.
pub fn register(
    runner: &dyn CommandRunner,
    binary: &Path,
    settings: &RegisterSettings,
) -> Result<RegisterOutcome> {
    let Some(repository) = &settings.repository else {
        return Ok(RegisterOutcome::Skipped {
            reason: "no registration repository configured".to_string(),
        });
    };

    if !repository.is_dir() {
        return Err(KindlingError::DeployFailed {
            message: format!(
                "registration repository {} is not a directory",
                repository.display()
            ),
        });
    }

    let invocation = register_invocation(binary, repository, &settings.args);
    tracing::info!(repository = %repository.display(), "{}", invocation);

    let result = runner.run(&invocation)?;
    if !result.success {
        tracing::debug!(diagnostic = %result.diagnostic(), "registration failed");
        return Err(KindlingError::CommandFailed {
            command: invocation.command_line(),
            code: result.exit_code,
        });
    }

    Ok(RegisterOutcome::Registered {
        repository: repository.clone(),
    })
}

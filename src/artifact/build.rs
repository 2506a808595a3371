//! Release build.

use std::path::{Path, PathBuf};

use crate::error::{KindlingError, Result};
use crate::shell::{CommandRunner, Invocation};

/// The release build command for a project.
pub fn build_invocation(project_root: &Path) -> Invocation {
    Invocation::new("cargo")
        .args(["build", "--release"])
        .current_dir(project_root)
        .streaming()
}

/// Where the release build leaves the binary.
pub fn release_binary(project_root: &Path, binary: &str) -> PathBuf {
    project_root.join("target").join("release").join(binary)
}

/// Build the project in release mode.
///
/// # Errors
///
/// `BuildFailed` if the build cannot start or exits non-zero.
pub fn build_release(runner: &dyn CommandRunner, project_root: &Path) -> Result<()> {
    let invocation = build_invocation(project_root);
    tracing::info!(cwd = %project_root.display(), "{}", invocation);

    let result = runner
        .run(&invocation)
        .map_err(|e| KindlingError::BuildFailed {
            message: e.to_string(),
        })?;

    if result.success {
        Ok(())
    } else {
        Err(KindlingError::BuildFailed {
            message: result.diagnostic(),
        })
    }
}

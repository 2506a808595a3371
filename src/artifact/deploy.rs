//! Copy the built binary and its completion scripts into per-user directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ArtifactSettings, CompletionEntry};
use crate::error::{KindlingError, Result};

/// What gets copied where.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    /// The freshly built binary.
    pub binary_source: PathBuf,

    /// Directory the binary is installed into.
    pub bin_dir: PathBuf,

    /// Installed file name.
    pub binary_name: String,

    /// Completion scripts, sources relative to `project_root`.
    pub completions: Vec<CompletionEntry>,

    pub project_root: PathBuf,
}

/// What was deployed.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub binary: PathBuf,
    pub completions: Vec<PathBuf>,

    /// Completion sources that did not exist.
    pub skipped: Vec<PathBuf>,
}

impl DeployPlan {
    pub fn new(
        settings: &ArtifactSettings,
        project_root: &Path,
        binary_source: PathBuf,
        binary_name: &str,
    ) -> Self {
        Self {
            binary_source,
            bin_dir: settings.bin_dir(),
            binary_name: binary_name.to_string(),
            completions: settings.completion_entries(binary_name),
            project_root: project_root.to_path_buf(),
        }
    }

    /// Path of the binary once deployed.
    pub fn installed_binary(&self) -> PathBuf {
        self.bin_dir.join(&self.binary_name)
    }
}

fn deploy_failed(what: &str, path: &Path, err: std::io::Error) -> KindlingError {
    KindlingError::DeployFailed {
        message: format!("{} {}: {}", what, path.display(), err),
    }
}

fn copy_into(source: &Path, dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| deploy_failed("cannot create", dir, e))?;
    let target = dir.join(name);
    fs::copy(source, &target).map_err(|e| deploy_failed("cannot copy to", &target, e))?;
    Ok(target)
}

/// Deploy the binary and completions.
///
/// Target directories are created as needed. A missing completion script is
/// reported in [`DeployReport::skipped`]; any other failure is fatal.
///
/// # Errors
///
/// `DeployFailed` if the binary is missing or a copy fails.
pub fn deploy(plan: &DeployPlan) -> Result<DeployReport> {
    if !plan.binary_source.is_file() {
        return Err(KindlingError::DeployFailed {
            message: format!("built binary not found at {}", plan.binary_source.display()),
        });
    }

    let binary = copy_into(&plan.binary_source, &plan.bin_dir, &plan.binary_name)?;
    make_executable(&binary)?;
    tracing::info!(path = %binary.display(), "installed binary");

    let mut report = DeployReport {
        binary,
        ..Default::default()
    };

    for entry in &plan.completions {
        let source = plan.project_root.join(&entry.source);
        if !source.is_file() {
            tracing::warn!(path = %source.display(), "completion script not found");
            report.skipped.push(source);
            continue;
        }

        let name = match &entry.file_name {
            Some(name) => name.clone(),
            None => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| plan.binary_name.clone()),
        };
        let target = copy_into(&source, &entry.target_dir, &name)?;
        tracing::debug!(path = %target.display(), "installed completion");
        report.completions.push(target);
    }

    Ok(report)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| deploy_failed("cannot chmod", path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plan(temp: &TempDir) -> DeployPlan {
        let project = temp.path().join("project");
        fs::create_dir_all(project.join("target/release")).unwrap();
        fs::create_dir_all(project.join("completions")).unwrap();
        fs::write(project.join("target/release/cmt"), b"\x7fELF").unwrap();
        fs::write(project.join("completions/cmt.bash"), "complete -F _cmt cmt").unwrap();
        fs::write(project.join("completions/_cmt"), "#compdef cmt").unwrap();

        DeployPlan {
            binary_source: project.join("target/release/cmt"),
            bin_dir: temp.path().join("home/.local/bin"),
            binary_name: "cmt".to_string(),
            completions: vec![
                CompletionEntry {
                    source: PathBuf::from("completions/cmt.bash"),
                    target_dir: temp.path().join("home/bash"),
                    file_name: Some("cmt".to_string()),
                },
                CompletionEntry {
                    source: PathBuf::from("completions/_cmt"),
                    target_dir: temp.path().join("home/zsh"),
                    file_name: None,
                },
            ],
            project_root: project,
        }
    }

    #[test]
    fn deploys_binary_and_completions() {
        let temp = TempDir::new().unwrap();
        let plan = plan(&temp);

        let report = deploy(&plan).unwrap();
        assert_eq!(report.binary, plan.installed_binary());
        assert!(report.binary.is_file());
        assert_eq!(report.completions.len(), 2);
        assert!(temp.path().join("home/bash/cmt").is_file());
        assert!(temp.path().join("home/zsh/_cmt").is_file());
        assert!(report.skipped.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn binary_is_executable() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let report = deploy(&plan(&temp)).unwrap();

        let mode = fs::metadata(&report.binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn missing_binary_is_deploy_failure() {
        let temp = TempDir::new().unwrap();
        let mut plan = plan(&temp);
        plan.binary_source = temp.path().join("nope");

        let err = deploy(&plan).unwrap_err();
        assert!(matches!(err, KindlingError::DeployFailed { .. }));
        assert!(!plan.bin_dir.exists());
    }

    #[test]
    fn missing_completion_is_skipped() {
        let temp = TempDir::new().unwrap();
        let plan = plan(&temp);
        fs::remove_file(plan.project_root.join("completions/_cmt")).unwrap();

        let report = deploy(&plan).unwrap();
        assert_eq!(report.completions.len(), 1);
        assert_eq!(report.skipped, vec![plan.project_root.join("completions/_cmt")]);
    }

    #[test]
    fn redeploy_overwrites() {
        let temp = TempDir::new().unwrap();
        let plan = plan(&temp);
        deploy(&plan).unwrap();
        fs::write(&plan.binary_source, b"v2").unwrap();

        let report = deploy(&plan).unwrap();
        assert_eq!(fs::read(report.binary).unwrap(), b"v2");
    }
}

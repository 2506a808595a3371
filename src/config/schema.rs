//! Configuration schema definitions for kindling.
//!
//! This module contains the struct definitions that map to the
//! `kindling.yml` file format. Every field has a default, so an empty
//! file (or no file at all) describes a working setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{KindlingError, Result};
use crate::toolchain::version::ToolchainVersion;

/// Root configuration structure for kindling.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KindlingConfig {
    /// How the compiler toolchain is provisioned
    pub toolchain: ToolchainSettings,

    /// What gets built and where it is deployed
    pub artifact: ArtifactSettings,
}

/// Toolchain provisioning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Minimum acceptable compiler version
    pub required_version: String,

    /// Channel installed and activated by the toolchain manager
    pub channel: String,

    /// Compiler executable probed for its version
    pub compiler: String,

    /// Toolchain manager executable
    pub manager: String,

    /// System package providing the compiler
    pub compiler_package: String,

    /// System package providing the build tool
    pub build_tool_package: String,

    /// System package providing the toolchain manager
    pub manager_package: String,

    /// Bootstrap installer script for the toolchain manager
    pub bootstrap_url: String,

    /// Lookups of the manager after a package-manager install
    pub readiness_attempts: u32,

    /// Seconds between readiness lookups
    pub readiness_delay_secs: u64,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            required_version: "1.70.0".to_string(),
            channel: "stable".to_string(),
            compiler: "rustc".to_string(),
            manager: "rustup".to_string(),
            compiler_package: "rustc".to_string(),
            build_tool_package: "cargo".to_string(),
            manager_package: "rustup".to_string(),
            bootstrap_url: "https://sh.rustup.rs".to_string(),
            readiness_attempts: 5,
            readiness_delay_secs: 2,
        }
    }
}

impl ToolchainSettings {
    /// The parsed minimum version.
    pub fn required(&self) -> Result<ToolchainVersion> {
        ToolchainVersion::parse(&self.required_version).ok_or_else(|| {
            KindlingError::ConfigValidationError {
                message: format!(
                    "toolchain.required_version '{}' is not a version",
                    self.required_version
                ),
            }
        })
    }

    /// Packages installed by the package-manager strategy.
    pub fn packages(&self) -> Vec<String> {
        vec![self.compiler_package.clone(), self.build_tool_package.clone()]
    }

    /// Delay between readiness lookups.
    pub fn readiness_delay(&self) -> Duration {
        Duration::from_secs(self.readiness_delay_secs)
    }
}

/// Build and deploy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// Binary name (defaults to the project directory name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,

    /// Install directory for the binary (defaults to ~/.local/bin)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<PathBuf>,

    /// Completion scripts to deploy (defaults to bash and zsh)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completions: Option<Vec<CompletionEntry>>,

    /// Self-registration of the deployed binary
    pub register: RegisterSettings,
}

/// One shell completion script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
    /// Script path, relative to the project root
    pub source: PathBuf,

    /// Directory the script is copied into
    pub target_dir: PathBuf,

    /// File name in the target directory (defaults to the source file name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Self-registration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterSettings {
    /// Repository the deployed binary registers itself into; skipped if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<PathBuf>,

    /// Arguments passed to the deployed binary
    pub args: Vec<String>,
}

impl Default for RegisterSettings {
    fn default() -> Self {
        Self {
            repository: None,
            args: vec!["install".to_string(), "--force".to_string()],
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

fn home_relative(parts: &[&str]) -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    for part in parts {
        path.push(part);
    }
    path
}

impl ArtifactSettings {
    /// Binary name, falling back to the project directory name.
    pub fn binary_name(&self, project_root: &Path) -> Option<String> {
        self.binary.clone().or_else(|| {
            project_root
                .file_name()
                .and_then(|n| n.to_str())
                .map(String::from)
        })
    }

    /// Install directory for the binary.
    pub fn bin_dir(&self) -> PathBuf {
        self.bin_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| home_relative(&[".local", "bin"]))
    }

    /// Completion scripts, with defaults derived from the binary name.
    pub fn completion_entries(&self, binary: &str) -> Vec<CompletionEntry> {
        if let Some(entries) = &self.completions {
            return entries
                .iter()
                .map(|e| CompletionEntry {
                    source: e.source.clone(),
                    target_dir: expand_home(&e.target_dir),
                    file_name: e.file_name.clone(),
                })
                .collect();
        }

        vec![
            CompletionEntry {
                source: PathBuf::from("completions").join(format!("{}.bash", binary)),
                target_dir: home_relative(&[".local", "share", "bash-completion", "completions"]),
                file_name: Some(binary.to_string()),
            },
            CompletionEntry {
                source: PathBuf::from("completions").join(format!("_{}", binary)),
                target_dir: home_relative(&[".local", "share", "zsh", "site-functions"]),
                file_name: None,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolchain_defaults() {
        let settings = ToolchainSettings::default();
        assert_eq!(settings.required().unwrap().as_str(), "1.70.0");
        assert_eq!(settings.channel, "stable");
        assert_eq!(settings.packages(), vec!["rustc", "cargo"]);
        assert_eq!(settings.readiness_attempts, 5);
        assert_eq!(settings.readiness_delay(), Duration::from_secs(2));
    }

    #[test]
    fn invalid_required_version_is_validation_error() {
        let settings = ToolchainSettings {
            required_version: "latest".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.required(),
            Err(KindlingError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn binary_name_falls_back_to_directory() {
        let settings = ArtifactSettings::default();
        assert_eq!(
            settings.binary_name(Path::new("/src/commit-helper")),
            Some("commit-helper".to_string())
        );

        let named = ArtifactSettings {
            binary: Some("cmt".to_string()),
            ..Default::default()
        };
        assert_eq!(named.binary_name(Path::new("/src/x")), Some("cmt".to_string()));
    }

    #[test]
    fn default_completions_cover_bash_and_zsh() {
        let entries = ArtifactSettings::default().completion_entries("cmt");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, PathBuf::from("completions/cmt.bash"));
        assert_eq!(entries[0].file_name.as_deref(), Some("cmt"));
        assert_eq!(entries[1].source, PathBuf::from("completions/_cmt"));
        assert!(entries[1].target_dir.ends_with("site-functions"));
    }

    #[test]
    fn explicit_completions_replace_defaults() {
        let settings = ArtifactSettings {
            completions: Some(vec![CompletionEntry {
                source: PathBuf::from("out/cmt.fish"),
                target_dir: PathBuf::from("/etc/fish/completions"),
                file_name: None,
            }]),
            ..Default::default()
        };
        let entries = settings.completion_entries("cmt");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target_dir, PathBuf::from("/etc/fish/completions"));
    }

    #[test]
    fn expand_home_only_touches_tilde_prefix() {
        assert_eq!(expand_home(Path::new("/opt/bin")), PathBuf::from("/opt/bin"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/bin")), home.join("bin"));
        }
    }

    #[test]
    fn register_defaults_to_forced_install_without_repository() {
        let register = RegisterSettings::default();
        assert!(register.repository.is_none());
        assert_eq!(register.args, vec!["install", "--force"]);
    }
}

//! Configuration file discovery and loading.

use crate::config::schema::KindlingConfig;
use crate::error::{KindlingError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name in the project root.
pub const CONFIG_FILE: &str = "kindling.yml";

/// The default config path for a project.
pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE)
}

/// Load a single config file and parse it into KindlingConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<KindlingConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KindlingError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            KindlingError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into KindlingConfig.
///
/// Empty content yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<KindlingConfig> {
    if content.trim().is_empty() {
        return Ok(KindlingConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| KindlingError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// An explicit path must exist. Without one, `kindling.yml` in the project
/// root is used when present and the defaults otherwise.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<KindlingConfig> {
    if let Some(path) = config_override {
        return load_config_file(path);
    }

    let path = default_config_path(project_root);
    if path.exists() {
        tracing::debug!(path = %path.display(), "loading config");
        load_config_file(&path)
    } else {
        tracing::debug!("no {} found, using defaults", CONFIG_FILE);
        Ok(KindlingConfig::default())
    }
}

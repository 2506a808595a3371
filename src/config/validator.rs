//! Configuration validation rules.
//!
//! - `toolchain.required_version` must parse as a version
//! - toolchain names and the binary name must be non-empty
//! - at least one readiness lookup is required

use crate::config::schema::KindlingConfig;
use crate::error::{KindlingError, Result};
use crate::toolchain::version::ToolchainVersion;
use std::path::Path;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Config key the error refers to
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, field: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            field: field.to_string(),
            message,
        }
    }
}

/// Validate a configuration and return all errors.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &KindlingConfig, project_root: &Path) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let toolchain = &config.toolchain;

    if ToolchainVersion::parse(&toolchain.required_version).is_none() {
        errors.push(ValidationError::new(
            "invalid-version",
            "toolchain.required_version",
            format!("'{}' is not a version", toolchain.required_version),
        ));
    }

    for (field, value) in [
        ("toolchain.channel", &toolchain.channel),
        ("toolchain.compiler", &toolchain.compiler),
        ("toolchain.manager", &toolchain.manager),
        ("toolchain.compiler_package", &toolchain.compiler_package),
        ("toolchain.manager_package", &toolchain.manager_package),
        ("toolchain.bootstrap_url", &toolchain.bootstrap_url),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-value",
                field,
                "must not be empty".to_string(),
            ));
        }
    }

    if !toolchain.bootstrap_url.starts_with("https://") {
        errors.push(ValidationError::new(
            "insecure-bootstrap",
            "toolchain.bootstrap_url",
            format!("'{}' must use https", toolchain.bootstrap_url),
        ));
    }

    // The URL is spliced into a quoted shell pipeline.
    if toolchain
        .bootstrap_url
        .chars()
        .any(|c| c == '\'' || c.is_whitespace())
    {
        errors.push(ValidationError::new(
            "unsafe-bootstrap",
            "toolchain.bootstrap_url",
            "must not contain quotes or whitespace".to_string(),
        ));
    }

    if toolchain.readiness_attempts == 0 {
        errors.push(ValidationError::new(
            "no-readiness-attempts",
            "toolchain.readiness_attempts",
            "must be at least 1".to_string(),
        ));
    }

    match config.artifact.binary_name(project_root) {
        Some(name) if !name.trim().is_empty() => {}
        _ => errors.push(ValidationError::new(
            "missing-binary",
            "artifact.binary",
            "could not determine the binary name; set artifact.binary".to_string(),
        )),
    }

    errors
}

/// Validate a configuration, failing on the first batch of errors.
pub fn validate(config: &KindlingConfig, project_root: &Path) -> Result<()> {
    let errors = validate_config(config, project_root);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(KindlingError::ConfigValidationError { message })
}

//! Error types for kindling operations.
//!
//! This module defines [`KindlingError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Provisioning failures map onto one variant per failure class (probe,
//!   acquisition, initialization, build, deploy)
//! - Best-effort diagnostics never become errors; they are recorded as failed
//!   [`AttemptOutcome`](crate::toolchain::AttemptOutcome)s and shown as warnings
//! - Use `anyhow::Error` (via `KindlingError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kindling operations.
#[derive(Debug, Error)]
pub enum KindlingError {
    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A probe could not produce a trustworthy answer.
    #[error("Probe '{probe}' failed: {message}")]
    ProbeFailed { probe: String, message: String },

    /// The toolchain (or its manager) could not be installed.
    #[error("Toolchain acquisition failed: {message}")]
    AcquisitionFailed { message: String },

    /// A fatal toolchain initialization stage failed.
    #[error("Toolchain initialization failed at {stage}: {message}")]
    InitializationFailed { stage: String, message: String },

    /// The release build failed.
    #[error("Build failed: {message}")]
    BuildFailed { message: String },

    /// Copying the built artifact into place failed.
    #[error("Deploy failed: {message}")]
    DeployFailed { message: String },

    /// External command exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// External command could not be spawned at all.
    #[error("Command not found: {program}")]
    CommandNotFound { program: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for kindling operations.
pub type Result<T> = std::result::Result<T, KindlingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = KindlingError::ConfigParseError {
            path: PathBuf::from("/project/kindling.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/project/kindling.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn probe_failed_displays_probe_and_message() {
        let err = KindlingError::ProbeFailed {
            probe: "repository candidate".into(),
            message: "no Candidate line".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("repository candidate"));
        assert!(msg.contains("no Candidate line"));
    }

    #[test]
    fn initialization_failed_displays_stage() {
        let err = KindlingError::InitializationFailed {
            stage: "install default toolchain".into(),
            message: "exit code 1".into(),
        };
        assert!(err.to_string().contains("install default toolchain"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = KindlingError::CommandFailed {
            command: "cargo build --release".into(),
            code: Some(101),
        };
        let msg = err.to_string();
        assert!(msg.contains("cargo build --release"));
        assert!(msg.contains("101"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: KindlingError = io_err.into();
        assert!(matches!(err, KindlingError::Io(_)));
    }
}

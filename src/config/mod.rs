//! Configuration loading, parsing, and validation for kindling.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use kindling::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("kindling.yml"), "artifact:\n  binary: cmt\n").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! validate(&config, temp.path()).unwrap();
//! assert_eq!(config.artifact.binary, Some("cmt".to_string()));
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{default_config_path, load_config, load_config_file, parse_config, CONFIG_FILE};
pub use schema::{
    expand_home, ArtifactSettings, CompletionEntry, KindlingConfig, RegisterSettings,
    ToolchainSettings,
};
pub use validator::{validate, validate_config, ValidationError};

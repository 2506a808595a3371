//! Kindling - provision a Rust toolchain, then build and deploy a CLI from source.
//!
//! Kindling makes sure a compiler at least as new as a required minimum is
//! installed, preferring the system package manager and falling back to
//! rustup, then builds the project in release mode, installs the binary and
//! its shell completions, and optionally registers or packages it.
//!
//! # Modules
//!
//! - [`artifact`] - Release build, deployment, registration and packaging
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Pipeline orchestration
//! - [`shell`] - External command execution
//! - [`toolchain`] - Toolchain probing, strategy selection and installation
//! - [`ui`] - Spinners, status lines and the run summary
//!
//! # Example
//!
//! ```
//! use kindling::toolchain::{select_strategy, ProbeResult, RepositoryProbe, Strategy, ToolchainVersion};
//!
//! let required = ToolchainVersion::parse("1.70.0").unwrap();
//! let probe = ProbeResult {
//!     installed_version: ToolchainVersion::parse("1.65.0"),
//!     manager_present: false,
//!     package_manager_present: true,
//!     repository: RepositoryProbe::Candidate {
//!         version: ToolchainVersion::parse("1.72.0").unwrap(),
//!     },
//! };
//!
//! let decision = select_strategy(&probe, &required);
//! assert_eq!(decision.strategy, Strategy::PackageManagerInstall);
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod toolchain;
pub mod ui;

pub use error::{KindlingError, Result};

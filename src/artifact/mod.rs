//! Build and deploy collaborators.
//!
//! Each is a single external step with a pass/fail outcome:
//! - [`build`] - release build
//! - [`deploy`] - binary and completion copy
//! - [`register`] - self-registration into a repository
//! - [`package`] - distribution packaging

pub mod build;
pub mod deploy;
pub mod package;
pub mod register;

pub use build::{build_release, release_binary};
pub use deploy::{deploy, DeployPlan, DeployReport};
pub use package::{package, PackageFormat};
pub use register::{register, RegisterOutcome};

//! Toolchain provisioning decision engine.
//!
//! Data flows one way: [`ToolchainProbe`] observes the machine,
//! [`select_strategy`] decides, [`InstallExecutor`] acts, and
//! [`ToolchainInitializer`] brings a toolchain manager to a usable default.
//!
//! - [`version`] - version parsing and ordering
//! - [`package_manager`] - system package manager commands and policy parsing
//! - [`acquisition`] - ordered sources for the toolchain manager

pub mod acquisition;
pub mod executor;
pub mod initializer;
pub mod package_manager;
pub mod probe;
pub mod selector;
pub mod status;
pub mod version;

pub use acquisition::{AcquisitionPlan, AcquisitionSource, Fetcher, ReadinessPoll};
pub use executor::InstallExecutor;
pub use initializer::{InitStage, ToolchainInitializer};
pub use package_manager::{parse_candidate, PolicyParseError, SystemPackageManager};
pub use probe::ToolchainProbe;
pub use selector::select_strategy;
pub use status::{
    AttemptOutcome, Decision, ProbeResult, ProvisionReport, RepositoryProbe, Strategy,
};
pub use version::{compare, meets_minimum, ToolchainVersion};

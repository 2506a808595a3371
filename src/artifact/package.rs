//! Distribution packaging.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::{KindlingError, Result};
use crate::shell::{CommandRunner, Invocation};

/// Distribution package format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    /// Arch Linux package via makepkg
    Arch,
    /// Debian package via cargo-deb
    Deb,
    /// RPM package via cargo-generate-rpm
    Rpm,
}

impl PackageFormat {
    /// The executable that must be on the search path.
    pub fn required_program(&self) -> &'static str {
        match self {
            PackageFormat::Arch => "makepkg",
            PackageFormat::Deb => "cargo-deb",
            PackageFormat::Rpm => "cargo-generate-rpm",
        }
    }

    /// The packaging command, run from the project root.
    pub fn invocation(&self, project_root: &Path) -> Invocation {
        let inv = match self {
            PackageFormat::Arch => Invocation::new("makepkg").arg("-sf"),
            PackageFormat::Deb => Invocation::new("cargo").arg("deb"),
            PackageFormat::Rpm => Invocation::new("cargo").arg("generate-rpm"),
        };
        inv.current_dir(project_root).streaming()
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageFormat::Arch => "arch",
            PackageFormat::Deb => "deb",
            PackageFormat::Rpm => "rpm",
        };
        f.write_str(name)
    }
}

/// Build a distribution package.
///
/// # Errors
///
/// `CommandNotFound` if the packaging tool is missing, `CommandFailed` if it
/// exits non-zero.
pub fn package(runner: &dyn CommandRunner, format: PackageFormat, project_root: &Path) -> Result<()> {
    let program = format.required_program();
    if !runner.is_available(program) {
        return Err(KindlingError::CommandNotFound {
            program: program.to_string(),
        });
    }

    let invocation = format.invocation(project_root);
    tracing::info!(format = %format, "{}", invocation);

    let result = runner.run(&invocation)?;
    if result.success {
        Ok(())
    } else {
        Err(KindlingError::CommandFailed {
            command: invocation.command_line(),
            code: result.exit_code,
        })
    }
}

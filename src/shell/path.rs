//! Search path handling.
//!
//! Program lookup walks the search path directly instead of shelling out to
//! `which`, whose behavior varies across systems and is sometimes a shell
//! builtin.

use std::path::{Path, PathBuf};

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. A `tool` that
/// already contains a path separator is checked as-is.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let direct = Path::new(tool);
    if direct.components().count() > 1 {
        return (direct.is_file() && is_executable(direct)).then(|| direct.to_path_buf());
    }

    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Directory where rustup-managed binaries are installed.
///
/// Honors `CARGO_HOME`, falling back to `~/.cargo/bin`.
pub fn cargo_bin_dir() -> Option<PathBuf> {
    cargo_bin_dir_with_env(|key| std::env::var(key))
}

/// [`cargo_bin_dir`] with a custom env var lookup function.
pub fn cargo_bin_dir_with_env<F>(env_fn: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    if let Ok(home) = env_fn("CARGO_HOME") {
        if !home.is_empty() {
            return Some(PathBuf::from(home).join("bin"));
        }
    }
    dirs::home_dir().map(|home| home.join(".cargo").join("bin"))
}

/// `extra` directories prepended to the inherited PATH.
///
/// An extra directory already on PATH moves to the front, so a toolchain
/// installed there shadows any system compiler.
pub fn augmented_path(extra: &[PathBuf]) -> Vec<PathBuf> {
    prepend_path(extra, parse_system_path())
}

/// [`augmented_path`] over an explicit list of system entries.
pub fn prepend_path(extra: &[PathBuf], system: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = Vec::with_capacity(extra.len() + system.len());
    for dir in extra.iter().cloned().chain(system) {
        if !entries.contains(&dir) {
            entries.push(dir);
        }
    }
    entries
}

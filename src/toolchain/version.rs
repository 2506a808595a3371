//! Toolchain version parsing and ordering.
//!
//! A version is a dot-separated run of non-negative integers, optionally
//! followed by a suffix (`-ubuntu1`, `+dfsg`, `-nightly`, `beta`) that is
//! ignored for ordering. Missing trailing segments compare as zero, so
//! `1.70` and `1.70.0` are equal.
//!
//! Parsing never falls back to a default: empty or malformed input yields
//! `None`, which [`meets_minimum`] treats as "not satisfied".
//!
//! # Example
//!
//! ```
//! use kindling::toolchain::version::{meets_minimum, ToolchainVersion};
//!
//! let required = ToolchainVersion::parse("1.70.0").unwrap();
//! let candidate = ToolchainVersion::parse("1.72.0-ubuntu1");
//! assert!(meets_minimum(candidate.as_ref(), &required));
//! assert!(!meets_minimum(None, &required));
//! ```

use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// First whitespace-delimited token that starts with `<digits>.<digits>`.
static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\d+(?:\.\d+)+\S*)").unwrap());

/// A parsed toolchain version.
#[derive(Debug, Clone)]
pub struct ToolchainVersion {
    segments: Vec<u64>,
    raw: String,
}

/// Returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}'")]
pub struct InvalidVersion(pub String);

impl ToolchainVersion {
    /// Parse a version string, returning `None` when it is empty or malformed.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let core_end = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (core, suffix) = trimmed.split_at(core_end);

        if core.is_empty() || core.starts_with('.') || core.ends_with('.') || core.contains("..")
        {
            return None;
        }

        // Epochs (`1:1.72.0`) and other separators are not suffixes.
        if let Some(first) = suffix.chars().next() {
            if !matches!(first, '-' | '+' | '~') && !first.is_ascii_alphabetic() {
                return None;
            }
        }

        let segments = core
            .split('.')
            .map(|s| s.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            segments,
            raw: trimmed.to_string(),
        })
    }

    /// Pull the version out of tool output such as
    /// `rustc 1.75.0 (82e1608df 2023-12-21)`.
    pub fn from_tool_output(output: &str) -> Option<Self> {
        VERSION_TOKEN
            .captures_iter(output)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| Self::parse(m.as_str()))
    }

    /// Numeric segments, suffix removed.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The numeric part only (`1.72.0` for `1.72.0-ubuntu1`).
    pub fn numeric(&self) -> String {
        self.segments
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether this version is at least `required`.
    pub fn satisfies(&self, required: &ToolchainVersion) -> bool {
        self >= required
    }
}

impl Ord for ToolchainVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ToolchainVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ToolchainVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToolchainVersion {}

impl FromStr for ToolchainVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidVersion(s.to_string()))
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ToolchainVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Compare two version strings.
///
/// Returns `None` when either side does not parse.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    let a = ToolchainVersion::parse(a)?;
    let b = ToolchainVersion::parse(b)?;
    Some(a.cmp(&b))
}

/// Whether `version` is present and at least `required`.
pub fn meets_minimum(version: Option<&ToolchainVersion>, required: &ToolchainVersion) -> bool {
    version.is_some_and(|v| v.satisfies(required))
}

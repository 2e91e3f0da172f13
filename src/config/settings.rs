// src/config/settings.rs
// =============================================================================
// The resolved, read-only settings value.
//
// A Settings value is produced exactly once by ConfigResolver and then lent
// (&Settings) to the checker, the rule engine and the reporters. Nothing
// mutates it after resolution.
// =============================================================================

use clap::ValueEnum;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 50;

// Directories nobody wants scanned for documentation links.
// Trailing '/' marks them as directory-only patterns.
pub const DEFAULT_PATH_EXCLUDES: &[&str] = &[
    ".git/",
    "node_modules/",
    ".venv/",
    "__pycache__/",
    ".pytest_cache/",
    ".idea/",
    "dist/",
    "build/",
    "target/",
];

/// Which environment the documentation is being checked for.
///
/// In `prod` mode, links to localhost, private networks and dev-only domains
/// are reported as rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Dev,
    Prod,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Mode::Dev),
            "prod" => Ok(Mode::Prod),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Dev => f.write_str("dev"),
            Mode::Prod => f.write_str("prod"),
        }
    }
}

/// Whether rule violations on their own make the run fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationPolicy {
    /// Violations are reported; the exit status depends on broken links only.
    #[default]
    Warn,
    /// Any violation also produces a failing exit status.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub mode: Mode,
    pub timeout_seconds: u64,
    pub concurrency_limit: usize,
    pub exclude_url_patterns: BTreeSet<String>,
    pub exclude_path_patterns: BTreeSet<String>,
    pub extra_headers: BTreeMap<String, String>,
    pub strict_ssl: bool,
    pub violation_policy: ViolationPolicy,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Dev,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            concurrency_limit: DEFAULT_CONCURRENCY,
            exclude_url_patterns: BTreeSet::new(),
            exclude_path_patterns: DEFAULT_PATH_EXCLUDES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            extra_headers: BTreeMap::new(),
            strict_ssl: true,
            violation_policy: ViolationPolicy::Warn,
        }
    }
}

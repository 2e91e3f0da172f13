// src/error.rs
// =============================================================================
// Fatal, pre-run errors.
//
// Only configuration problems are modelled as Rust errors. Per-URL failures
// (unreachable hosts, timeouts, TLS problems, bad URLs) are ordinary values
// of checker::ProbeOutcome and end up inside a LinkResult instead.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{field}' must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: i64 },

    #[error("Unknown mode '{0}' (expected 'dev' or 'prod')")]
    InvalidMode(String),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid header '{0}' (expected 'Name: value')")]
    InvalidHeader(String),
}

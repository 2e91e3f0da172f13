// src/model.rs
// =============================================================================
// Shared data types that flow through the whole pipeline.
//
// - LinkReference: one occurrence of a URL in a source file (from extract)
// - LinkResult: the final, classified answer for one LinkReference
// - RuleViolation: a structured annotation added by the rule engine
//
// A LinkResult is built once per LinkReference at the aggregation step and is
// never mutated concurrently.
// =============================================================================

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A URL found in a source file, at a 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub url: String,
    pub source_file: PathBuf,
    pub line_number: usize,
}

impl LinkReference {
    pub fn new(url: impl Into<String>, source_file: impl Into<PathBuf>, line_number: usize) -> Self {
        Self {
            url: url.into(),
            source_file: source_file.into(),
            line_number,
        }
    }
}

/// Final classification of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    Broken,
    Skipped,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusKind::Ok => "ok",
            StatusKind::Broken => "broken",
            StatusKind::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    #[serde(rename = "rule")]
    pub rule_name: String,
    pub message: String,
    pub severity: Severity,
}

// Serialized with the field names the reporters expect:
// {url, file, line, status, http_status, reason, elapsed_ms, violations}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkResult {
    pub url: String,
    #[serde(rename = "file")]
    pub source_file: PathBuf,
    #[serde(rename = "line")]
    pub line_number: usize,
    #[serde(rename = "status")]
    pub status_kind: StatusKind,
    pub http_status: Option<u16>,
    pub reason: Option<String>,
    pub elapsed_ms: u64,
    #[serde(rename = "violations")]
    pub rule_violations: Vec<RuleViolation>,
}

impl LinkResult {
    pub fn is_broken(&self) -> bool {
        self.status_kind == StatusKind::Broken
    }

    pub fn has_violations(&self) -> bool {
        !self.rule_violations.is_empty()
    }
}

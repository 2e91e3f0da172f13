// src/report/mod.rs
// =============================================================================
// Presentation of a finished run.
//
// - print_results: human-readable table on stdout, or a JSON document with
//   --json
// - export: the same data written to a .json, .csv or .md file
// - progress: an indicatif bar fed by the checker's progress channel
//
// Everything here only reads the final, ordered Vec<LinkResult>.
// =============================================================================

mod progress;

pub use progress::spawn_progress_bar;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::config::{Mode, Settings};
use crate::model::{LinkResult, StatusKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_scanned: usize,
    pub total: usize,
    pub ok: usize,
    pub broken: usize,
    pub skipped: usize,
    pub violations: usize,
}

impl Summary {
    pub fn new(files_scanned: usize, results: &[LinkResult]) -> Self {
        let count = |kind: StatusKind| results.iter().filter(|r| r.status_kind == kind).count();
        Self {
            files_scanned,
            total: results.len(),
            ok: count(StatusKind::Ok),
            broken: count(StatusKind::Broken),
            skipped: count(StatusKind::Skipped),
            violations: results.iter().map(|r| r.rule_violations.len()).sum(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mode: Mode,
    timeout_seconds: u64,
    summary: Summary,
    results: &'a [LinkResult],
}

fn to_json(results: &[LinkResult], summary: Summary, settings: &Settings) -> Result<String> {
    let report = JsonReport {
        mode: settings.mode,
        timeout_seconds: settings.timeout_seconds,
        summary,
        results,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

// Prints the results either as a table or JSON
pub fn print_results(
    results: &[LinkResult],
    summary: Summary,
    settings: &Settings,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", to_json(results, summary, settings)?);
    } else {
        print_table(results, summary);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal.
// Only problems are listed row by row; healthy links show up in the summary.
fn print_table(results: &[LinkResult], summary: Summary) {
    let problems: Vec<&LinkResult> = results
        .iter()
        .filter(|r| r.is_broken() || r.has_violations())
        .collect();

    if !problems.is_empty() {
        println!("{:<30} {:<50} {:<12} {:<30}", "LOCATION", "URL", "STATUS", "DETAIL");
        println!("{}", "=".repeat(125));

        for result in problems {
            let location = format!("{}:{}", result.source_file.display(), result.line_number);
            println!(
                "{:<30} {:<50} {:<12} {:<30}",
                truncate(&location, 30),
                truncate(&result.url, 50),
                format_status(result),
                detail(result)
            );
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   📄 Files scanned: {}", summary.files_scanned);
    println!("   ✅ OK: {}", summary.ok);
    println!("   ❌ Broken: {}", summary.broken);
    println!("   ⏭️  Skipped: {}", summary.skipped);
    println!("   ⚠️  Rule violations: {}", summary.violations);
    println!("   📋 Total: {}", summary.total);
}

fn format_status(result: &LinkResult) -> String {
    match result.status_kind {
        StatusKind::Ok => "✅ OK".to_string(),
        StatusKind::Skipped => "⏭️  SKIPPED".to_string(),
        StatusKind::Broken => match result.reason.as_deref() {
            Some("timeout") => "⏱️  TIMEOUT".to_string(),
            Some("ssl_error") => "🔒 SSL ERROR".to_string(),
            Some("unreachable") => "🌐 UNREACHABLE".to_string(),
            Some("invalid_url") => "🚫 INVALID".to_string(),
            _ => "❌ BROKEN".to_string(),
        },
    }
}

fn detail(result: &LinkResult) -> String {
    let mut parts = Vec::new();
    if let Some(status) = result.http_status {
        parts.push(format!("HTTP {status}"));
    } else if let Some(reason) = &result.reason {
        parts.push(reason.clone());
    }
    for violation in &result.rule_violations {
        parts.push(format!("[{}] {}", violation.severity, violation.rule_name));
    }
    parts.join(" ")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Writes a report file. The format follows the extension: `.json`, `.md`
/// or `.markdown`.
pub fn export(
    path: &Path,
    results: &[LinkResult],
    summary: Summary,
    settings: &Settings,
) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let contents = match extension.as_deref() {
        Some("json") => to_json(results, summary, settings)?,
        Some("csv") => to_csv(results)?,
        Some("md" | "markdown") => to_markdown(results, summary, settings),
        _ => bail!(
            "unsupported export format '{}' (use .json, .csv, .md or .markdown)",
            path.display()
        ),
    };

    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

// One CSV row per result; violations are joined into one cell
#[derive(Serialize)]
struct CsvRow<'a> {
    file: String,
    line: usize,
    url: &'a str,
    status: StatusKind,
    http_status: Option<u16>,
    reason: Option<&'a str>,
    elapsed_ms: u64,
    violations: String,
}

fn to_csv(results: &[LinkResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in results {
        writer.serialize(CsvRow {
            file: result.source_file.display().to_string(),
            line: result.line_number,
            url: &result.url,
            status: result.status_kind,
            http_status: result.http_status,
            reason: result.reason.as_deref(),
            elapsed_ms: result.elapsed_ms,
            violations: result
                .rule_violations
                .iter()
                .map(|v| v.rule_name.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("failed to finish CSV report")?;
    String::from_utf8(bytes).context("CSV report is not valid UTF-8")
}

fn to_markdown(results: &[LinkResult], summary: Summary, settings: &Settings) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "# Link Check Report\n");
    let _ = writeln!(
        out,
        "Mode: `{}` | Timeout: {}s | Files scanned: {}\n",
        settings.mode, settings.timeout_seconds, summary.files_scanned
    );
    let _ = writeln!(out, "| Metric | Count |\n|---|---:|");
    for (label, value) in [
        ("Total links", summary.total),
        ("OK", summary.ok),
        ("Broken", summary.broken),
        ("Skipped", summary.skipped),
        ("Rule violations", summary.violations),
    ] {
        let _ = writeln!(out, "| {label} | {value} |");
    }

    let problems: Vec<&LinkResult> = results
        .iter()
        .filter(|r| r.is_broken() || r.has_violations())
        .collect();
    if problems.is_empty() {
        let _ = writeln!(out, "\nNo problems found.");
        return out;
    }

    let _ = writeln!(out, "\n## Problems\n");
    let _ = writeln!(out, "| Location | URL | Status | Detail |\n|---|---|---|---|");
    for result in problems {
        let _ = writeln!(
            out,
            "| `{}:{}` | {} | {} | {} |",
            result.source_file.display(),
            result.line_number,
            result.url.replace('|', "\\|"),
            result.status_kind,
            detail(result).replace('|', "\\|")
        );
    }
    out
}

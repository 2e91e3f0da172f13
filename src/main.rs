// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and set up logging
// 2. Resolve the settings (CLI > config file > defaults) - fatal on error
// 3. Scan the project for files and extract their links
// 4. Check every distinct URL concurrently, then fan results back out
// 5. Print / export the report
// 6. Exit with a code CI can act on:
//      0   = everything fine
//      1   = broken links (or violations with --fail-on-violations)
//      2   = fatal error (bad configuration, HTTP client failure)
//      130 = interrupted with Ctrl-C
// =============================================================================

mod aggregate;
mod checker;
mod cli;
mod config;
mod error;
mod extract;
mod logging;
mod model;
mod report;
mod rules;
mod scan;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use aggregate::check_references;
use checker::{HttpTransport, LinkChecker};
use cli::{Cli, Commands, ScanArgs};
use config::{ConfigResolver, ViolationPolicy};
use report::Summary;
use rules::RuleEngine;
use scan::PathFilter;

const EXIT_OK: i32 = 0;
const EXIT_FAILED: i32 = 1;
const EXIT_ERROR: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scan(args) => handle_scan(args).await,
    }
}

async fn handle_scan(args: ScanArgs) -> Result<i32> {
    let root = args.directory.clone();
    if !root.is_dir() {
        bail!("not a directory: {}", root.display());
    }

    // Everything configuration-related fails here, before any network call
    let mut resolver = ConfigResolver::new(&root).with_overrides(args.overrides()?);
    if let Some(path) = &args.config {
        resolver = resolver.with_config_file(path);
    }
    let settings = resolver.resolve()?;
    let rules = RuleEngine::new(&settings)?;
    let filter = PathFilter::new(&settings.exclude_path_patterns)?;

    // In --json mode stdout carries only the JSON document
    let chatty = !args.json;
    if chatty {
        println!("🔍 Scanning directory: {}", root.display());
        println!(
            "   Mode: {} | Timeout: {}s | Concurrency: {}",
            settings.mode, settings.timeout_seconds, settings.concurrency_limit
        );
    }

    let files = scan::scan_files(&root, &filter);
    let mut references = Vec::new();
    for file in &files {
        match extract::extract_file(&root, file) {
            Ok(found) => references.extend(found),
            Err(e) => warn!(file = %file.display(), error = %format!("{e:#}"), "skipping file"),
        }
    }
    info!(files = files.len(), links = references.len(), "extraction finished");

    if chatty {
        println!(
            "📄 Found {} file(s) with {} link(s)\n",
            files.len(),
            references.len()
        );
    }

    let transport = HttpTransport::new(&settings)?;
    let checker = LinkChecker::new(transport, &settings);
    info!(limit = checker.concurrency_limit(), "admission gate ready");

    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let progress = report::spawn_progress_bar(progress_rx, references.len(), args.json);

    // Ctrl-C drops the whole batch: every in-flight probe is cancelled and
    // its gate slot released.
    let results = tokio::select! {
        results = check_references(&references, &checker, &rules, Some(progress_tx)) => results,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, cancelling in-flight checks");
            progress.abort();
            eprintln!("Interrupted");
            return Ok(EXIT_INTERRUPTED);
        }
    };
    // The sender was dropped with the batch, so the bar task is finishing
    let _ = progress.await;

    let summary = Summary::new(files.len(), &results);
    report::print_results(&results, summary, &settings, args.json)?;

    if let Some(path) = &args.export {
        // A failed export does not change the verdict on the links
        match report::export(path, &results, summary, &settings) {
            Ok(()) if chatty => println!("\n🎉 Results exported to {}", path.display()),
            Ok(()) => {}
            Err(e) => eprintln!("❌ Failed to export results: {:#}", e),
        }
    }

    Ok(exit_code(&summary, settings.violation_policy))
}

fn exit_code(summary: &Summary, policy: ViolationPolicy) -> i32 {
    let violations_fail = policy == ViolationPolicy::Fail && summary.violations > 0;
    if summary.broken > 0 || violations_fail {
        EXIT_FAILED
    } else {
        EXIT_OK
    }
}

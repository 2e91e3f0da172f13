// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every option here is optional: anything left out falls back to
// linkguard.config.json and then to the built-in defaults (see config/).
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{parse_header, Mode, Overrides};
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(
    name = "linkguard",
    version,
    about = "Check documentation links and flag dev-only URLs before they ship",
    long_about = "linkguard scans a project's documentation for links, checks every distinct URL \
                  concurrently, and in prod mode reports links to localhost, private networks and \
                  dev-only domains. It's built for CI pipelines."
)]
pub struct Cli {
    /// Show debug logs on stderr (LINKGUARD_LOG overrides this)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory for broken links and dev URLs
    ///
    /// Example: linkguard scan docs/ --mode prod --export report.md
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Project directory to scan
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// 'dev' allows localhost URLs, 'prod' flags them
    #[arg(long, short, value_enum)]
    pub mode: Option<Mode>,

    /// Per-request timeout in seconds
    #[arg(long, short)]
    pub timeout: Option<u64>,

    /// Maximum number of requests in flight
    #[arg(long, short)]
    pub concurrency: Option<usize>,

    /// Config file to use instead of <directory>/linkguard.config.json
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip URLs matching this glob (repeatable)
    #[arg(long = "exclude-url", value_name = "GLOB")]
    pub exclude_urls: Vec<String>,

    /// Skip files or directories matching this glob (repeatable, trailing '/' = directory only)
    #[arg(long = "exclude-path", value_name = "GLOB")]
    pub exclude_paths: Vec<String>,

    /// Extra request header, e.g. -H "Authorization: Bearer xyz" (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Exit with code 1 when rule violations are found, even if no link is broken
    #[arg(long)]
    pub fail_on_violations: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Also write the report to a .json, .csv, .md or .markdown file
    #[arg(long, short, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

impl ScanArgs {
    /// The subset of settings given on the command line.
    pub fn overrides(&self) -> Result<Overrides, ConfigError> {
        let extra_headers = self
            .headers
            .iter()
            .map(|raw| parse_header(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Overrides {
            mode: self.mode,
            timeout_seconds: self.timeout,
            concurrency_limit: self.concurrency,
            exclude_url_patterns: self.exclude_urls.clone(),
            exclude_path_patterns: self.exclude_paths.clone(),
            extra_headers,
            strict_ssl: self.insecure.then_some(false),
            fail_on_violations: self.fail_on_violations.then_some(true),
        })
    }
}

// src/logging.rs
// =============================================================================
// Structured logging setup.
//
// Logs go to stderr so that `--json` output on stdout stays machine-readable.
// LINKGUARD_LOG takes a tracing EnvFilter directive (e.g. "linkguard=trace")
// and wins over --verbose.
// =============================================================================

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LINKGUARD_LOG";

pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Dependencies (hyper, rustls) stay at warn even in verbose mode
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,linkguard=debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            assert!(default_directive(verbose).parse::<EnvFilter>().is_ok());
        }
    }
}

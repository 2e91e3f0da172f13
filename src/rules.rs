// src/rules.rs
// =============================================================================
// RuleEngine: environment-aware classification of links.
//
// Evaluation order for every reference:
//   (a) exclusion: a URL matching an exclude_url pattern is `skipped`, never
//       probed, and nothing else is evaluated for it
//   (b) environment: loopback, private-network and dev-only hosts are fine
//       in dev mode and a `dev-url-in-prod` violation in prod mode, whether
//       or not they answered
//   (c) reachability: status, http_status and reason from the checker
//
// A link can be `ok` and still carry a violation (a reachable localhost URL
// in prod mode).
// =============================================================================

use globset::{GlobSet, GlobSetBuilder};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::warn;
use url::{Host, Url};

use crate::checker::{normalize_url, CheckedUrl};
use crate::config::{compile_glob, Mode, Settings};
use crate::error::ConfigError;
use crate::model::{LinkReference, LinkResult, RuleViolation, Severity, StatusKind};

pub const DEV_URL_IN_PROD: &str = "dev-url-in-prod";

// Domains that only make sense on a developer machine or internal network
const DEV_DOMAIN_SUFFIXES: &[&str] = &[".localhost", ".local", ".test", ".internal"];

pub struct RuleEngine {
    mode: Mode,
    excludes: GlobSet,
}

impl RuleEngine {
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &settings.exclude_url_patterns {
            builder.add(compile_glob(pattern)?);
        }
        let excludes = builder.build().map_err(|source| ConfigError::InvalidPattern {
            pattern: settings
                .exclude_url_patterns
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;

        Ok(Self {
            mode: settings.mode,
            excludes,
        })
    }

    /// Step (a). Checked against both the URL as written and its normalized
    /// form, so `https://Example.com` is caught by `https://example.com/*`.
    pub fn is_excluded(&self, url: &str) -> bool {
        let raw = url.trim();
        self.excludes.is_match(raw) || self.excludes.is_match(normalize_url(raw))
    }

    /// Step (b) for one URL.
    pub fn environment_violations(&self, url: &str) -> Vec<RuleViolation> {
        if self.mode != Mode::Prod || !is_dev_url(url) {
            return Vec::new();
        }
        vec![RuleViolation {
            rule_name: DEV_URL_IN_PROD.to_string(),
            message: "Localhost/development URL found in production mode".to_string(),
            severity: Severity::Error,
        }]
    }

    /// Runs (a), (b) and (c) for one reference. `checked` is the checker's
    /// answer for the reference's normalized URL; it is not consulted for
    /// excluded URLs.
    pub fn evaluate(&self, reference: &LinkReference, checked: Option<&CheckedUrl>) -> LinkResult {
        let mut result = LinkResult {
            url: reference.url.clone(),
            source_file: reference.source_file.clone(),
            line_number: reference.line_number,
            status_kind: StatusKind::Skipped,
            http_status: None,
            reason: Some("excluded".to_string()),
            elapsed_ms: 0,
            rule_violations: Vec::new(),
        };

        if self.is_excluded(&reference.url) {
            return result;
        }

        result.rule_violations = self.environment_violations(&reference.url);

        match checked {
            Some(checked) => {
                result.status_kind = checked.outcome.status_kind();
                result.http_status = checked.outcome.http_status();
                result.reason = checked.outcome.reason().map(str::to_string);
                result.elapsed_ms = checked.elapsed_ms;
            }
            None => {
                warn!(url = %reference.url, "no check outcome for url");
                result.status_kind = StatusKind::Broken;
                result.reason = Some("not_checked".to_string());
            }
        }

        result
    }

    /// Recomputes the rule violations of an already classified result.
    /// Running it twice under the same mode changes nothing.
    pub fn reapply(&self, result: &mut LinkResult) {
        result.rule_violations = if result.status_kind == StatusKind::Skipped {
            Vec::new()
        } else {
            self.environment_violations(&result.url)
        };
    }
}

/// True when the URL points at localhost, a private network or a dev-only
/// domain. Unparseable URLs are never dev URLs.
pub fn is_dev_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    match parsed.host() {
        Some(Host::Domain(domain)) => is_dev_domain(domain),
        Some(Host::Ipv4(ip)) => is_dev_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_dev_ipv6(ip),
        None => false,
    }
}

fn is_dev_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || DEV_DOMAIN_SUFFIXES.iter().any(|suffix| domain.ends_with(suffix))
}

fn is_dev_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_unspecified() || ip.is_link_local()
}

fn is_dev_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_dev_ipv4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local fc00::/7
        || (first & 0xffc0) == 0xfe80 // link local fe80::/10
}

// src/aggregate.rs
// =============================================================================
// Fan-out / fan-in around the checker.
//
// 1. plan_targets: drop excluded references, then collapse the rest to their
//    distinct normalized URLs (first-seen order)
// 2. LinkChecker::check_all probes each distinct URL once
// 3. aggregate: walk the references again, in scan order, and build one
//    LinkResult per reference from its URL's outcome
//
// aggregate only runs after check_all has returned, so it is the barrier
// between the concurrent phase and reporting.
// =============================================================================

use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::checker::{normalize_url, CheckedUrl, LinkChecker, Progress, Transport};
use crate::model::{LinkReference, LinkResult};
use crate::rules::RuleEngine;

/// Distinct normalized URLs that actually need a probe.
pub fn plan_targets(references: &[LinkReference], rules: &RuleEngine) -> Vec<String> {
    let mut seen = HashSet::new();
    references
        .iter()
        .filter(|reference| !rules.is_excluded(&reference.url))
        .map(|reference| normalize_url(&reference.url))
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// One LinkResult per reference, in the order the references were given.
pub fn aggregate(
    references: &[LinkReference],
    outcomes: &HashMap<String, CheckedUrl>,
    rules: &RuleEngine,
) -> Vec<LinkResult> {
    references
        .iter()
        .map(|reference| {
            let checked = outcomes.get(&normalize_url(&reference.url));
            rules.evaluate(reference, checked)
        })
        .collect()
}

/// Runs the whole check for a scan: plan, probe, aggregate.
pub async fn check_references<T: Transport>(
    references: &[LinkReference],
    checker: &LinkChecker<T>,
    rules: &RuleEngine,
    progress: Option<mpsc::UnboundedSender<Progress>>,
) -> Vec<LinkResult> {
    let targets = plan_targets(references, rules);
    info!(
        references = references.len(),
        distinct = targets.len(),
        "checking links"
    );

    let outcomes = checker.check_all(targets, progress).await;
    debug!(free_slots = checker.available_slots(), "batch finished");
    aggregate(references, &outcomes, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{FakeTransport, Method};
    use crate::config::{Mode, Settings};
    use crate::model::StatusKind;
    use crate::rules::DEV_URL_IN_PROD;
    use std::time::Duration;

    fn settings(mode: Mode, excludes: &[&str]) -> Settings {
        Settings {
            mode,
            concurrency_limit: 4,
            exclude_url_patterns: excludes.iter().map(|p| p.to_string()).collect(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_shared_url_is_probed_once_and_fanned_out() {
        let settings = settings(Mode::Dev, &[]);
        let transport = FakeTransport::default().answer(
            "https://example.com/missing",
            Method::Head,
            Ok(404),
        );
        let checker = LinkChecker::new(transport, &settings);
        let rules = RuleEngine::new(&settings).unwrap();

        let references = vec![
            LinkReference::new("https://example.com/missing", "README.md", 4),
            LinkReference::new("https://EXAMPLE.com/missing#top", "docs/guide.md", 10),
            LinkReference::new("https://example.com/missing", "docs/faq.md", 2),
        ];

        let results = check_references(&references, &checker, &rules, None).await;

        assert_eq!(checker_calls(&checker), 1);
        assert_eq!(results.len(), 3);
        for (result, reference) in results.iter().zip(&references) {
            assert_eq!(result.status_kind, StatusKind::Broken);
            assert_eq!(result.http_status, Some(404));
            assert_eq!(result.reason.as_deref(), Some("http_error"));
            assert_eq!(result.url, reference.url);
            assert_eq!(result.source_file, reference.source_file);
            assert_eq!(result.line_number, reference.line_number);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_follows_scan_order_not_completion_order() {
        let settings = settings(Mode::Dev, &[]);
        // Earlier references finish last
        let mut transport = FakeTransport::default();
        let urls: Vec<String> = (0..8).map(|i| format!("https://site{i}.example/")).collect();
        for (i, url) in urls.iter().enumerate() {
            transport = transport.delay(url, Duration::from_millis(100 * (8 - i as u64)));
        }
        let checker = LinkChecker::new(transport, &settings);
        let rules = RuleEngine::new(&settings).unwrap();

        let references: Vec<LinkReference> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| LinkReference::new(url.clone(), "README.md", i + 1))
            .collect();

        let results = check_references(&references, &checker, &rules, None).await;

        let lines: Vec<usize> = results.iter().map(|r| r.line_number).collect();
        assert_eq!(lines, (1..=8).collect::<Vec<_>>());
        let result_urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        let expected: Vec<&str> = urls.iter().map(String::as_str).collect();
        assert_eq!(result_urls, expected);
    }

    #[tokio::test]
    async fn test_excluded_urls_are_never_probed() {
        let settings = settings(Mode::Dev, &["https://internal.example/*"]);
        let checker = LinkChecker::new(FakeTransport::default(), &settings);
        let rules = RuleEngine::new(&settings).unwrap();

        let references = vec![
            LinkReference::new("https://internal.example/wiki", "README.md", 1),
            LinkReference::new("https://public.example/", "README.md", 2),
        ];

        let results = check_references(&references, &checker, &rules, None).await;

        assert_eq!(results[0].status_kind, StatusKind::Skipped);
        assert_eq!(results[1].status_kind, StatusKind::Ok);
        assert_eq!(checker_calls(&checker), 1);
    }

    #[tokio::test]
    async fn test_prod_mode_flags_reachable_dev_url() {
        let settings = settings(Mode::Prod, &[]);
        let checker = LinkChecker::new(FakeTransport::default(), &settings);
        let rules = RuleEngine::new(&settings).unwrap();

        let references = vec![
            LinkReference::new("http://127.0.0.1:3000", "docs/dev.md", 7),
            LinkReference::new("https://example.org/", "docs/dev.md", 8),
        ];

        let results = check_references(&references, &checker, &rules, None).await;

        assert_eq!(results[0].status_kind, StatusKind::Ok);
        assert_eq!(results[0].rule_violations.len(), 1);
        assert_eq!(results[0].rule_violations[0].rule_name, DEV_URL_IN_PROD);
        assert!(results[1].rule_violations.is_empty());
    }

    #[test]
    fn test_plan_targets_deduplicates_in_first_seen_order() {
        let settings = settings(Mode::Dev, &["*/skip/*"]);
        let rules = RuleEngine::new(&settings).unwrap();
        let references = vec![
            LinkReference::new("https://b.example/x", "a.md", 1),
            LinkReference::new("https://a.example/x", "a.md", 2),
            LinkReference::new("https://b.example/x#frag", "b.md", 1),
            LinkReference::new("https://c.example/skip/me", "b.md", 2),
        ];

        assert_eq!(
            plan_targets(&references, &rules),
            vec!["https://b.example/x", "https://a.example/x"]
        );
    }

    fn checker_calls(checker: &LinkChecker<FakeTransport>) -> usize {
        checker.transport().calls().len()
    }
}

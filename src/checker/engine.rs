// src/checker/engine.rs
// =============================================================================
// LinkChecker: validates a batch of distinct URLs under bounded concurrency.
//
// How it works:
// 1. Every distinct URL becomes one future; all of them live in a single
//    FuturesUnordered polled by the calling task (no spawned tasks).
// 2. Each future first waits for a slot on the admission gate (a tokio
//    Semaphore sized to concurrency_limit). Waiting is a real suspension,
//    not polling.
// 3. Holding the slot, it sends HEAD. If the server refuses HEAD (403, 405,
//    501 or a rejected exchange) it sends GET exactly once.
// 4. Every request is wrapped in tokio::time::timeout.
// 5. The answer is classified into a ProbeOutcome.
//
// Dropping the future returned by check_all drops every in-flight probe, and
// each probe's SemaphorePermit is returned to the gate as it is dropped.
// =============================================================================

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};
use url::Url;

use super::normalize::parse_target;
use super::outcome::{classify, disallows_head, ProbeOutcome};
use super::transport::{Method, Transport, TransportError};
use crate::config::Settings;

/// Outcome for one distinct URL plus how long its probe took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedUrl {
    pub outcome: ProbeOutcome,
    pub elapsed_ms: u64,
}

/// Sent once per completed distinct URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

pub struct LinkChecker<T> {
    transport: T,
    gate: Arc<Semaphore>,
    concurrency_limit: usize,
    timeout: Duration,
}

impl<T: Transport> LinkChecker<T> {
    pub fn new(transport: T, settings: &Settings) -> Self {
        // Semaphore::new panics above MAX_PERMITS
        let concurrency_limit = settings.concurrency_limit.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            transport,
            gate: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
            timeout: settings.timeout(),
        }
    }

    /// Free slots on the admission gate right now.
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Checks every distinct URL in `urls` and returns one entry per URL.
    ///
    /// Duplicates in the input are probed once. Completion order is not
    /// preserved; callers look results up by URL.
    pub async fn check_all(
        &self,
        urls: Vec<String>,
        progress: Option<mpsc::UnboundedSender<Progress>>,
    ) -> HashMap<String, CheckedUrl> {
        let mut seen = HashSet::with_capacity(urls.len());
        let distinct: Vec<String> = urls.into_iter().filter(|u| seen.insert(u.clone())).collect();
        let total = distinct.len();

        let mut pending: FuturesUnordered<_> = distinct
            .into_iter()
            .map(|url| async move {
                let checked = self.check_one(&url).await;
                (url, checked)
            })
            .collect();

        let mut results = HashMap::with_capacity(total);
        let mut done = 0;
        while let Some((url, checked)) = pending.next().await {
            done += 1;
            if let Some(tx) = &progress {
                // A closed receiver only means nobody is watching anymore
                let _ = tx.send(Progress { done, total });
            }
            results.insert(url, checked);
        }

        results
    }

    async fn check_one(&self, raw: &str) -> CheckedUrl {
        let Some(url) = parse_target(raw) else {
            debug!(url = raw, "invalid url, not probing");
            return CheckedUrl {
                outcome: ProbeOutcome::InvalidUrl,
                elapsed_ms: 0,
            };
        };

        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                // The gate is never closed while a checker is alive
                warn!(url = raw, "admission gate closed");
                return CheckedUrl {
                    outcome: ProbeOutcome::Unreachable,
                    elapsed_ms: 0,
                };
            }
        };

        let started = Instant::now();
        let outcome = self.probe(&url).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(url = raw, ?outcome, elapsed_ms, "probe finished");
        CheckedUrl {
            outcome,
            elapsed_ms,
        }
    }

    async fn probe(&self, url: &Url) -> ProbeOutcome {
        match self.send(Method::Head, url).await {
            Ok(status) if disallows_head(status) => {
                debug!(%url, status, "HEAD refused, retrying with GET");
            }
            Err(TransportError::Rejected(reason)) => {
                debug!(%url, %reason, "HEAD rejected, retrying with GET");
            }
            answer => return classify(answer),
        }

        classify(self.send(Method::Get, url).await)
    }

    async fn send(&self, method: Method, url: &Url) -> Result<u16, TransportError> {
        match timeout(self.timeout, self.transport.send(method, url)).await {
            Ok(answer) => answer,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

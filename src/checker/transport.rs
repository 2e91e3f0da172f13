// src/checker/transport.rs
// =============================================================================
// The seam between the checking engine and the network.
//
// LinkChecker only ever talks to a Transport. In production that is
// HttpTransport (reqwest); in tests it is a scripted fake that can count
// probes, delay answers, and record how many requests overlap.
// =============================================================================

use std::future::Future;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Head,
    Get,
}

/// Why a request produced no HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// DNS failure, refused connection, redirect loop
    Unreachable(String),
    /// Certificate or handshake problem
    Tls(String),
    /// The transport gave up waiting
    Timeout,
    /// The server dropped or mangled the exchange; worth a retry with GET
    Rejected(String),
}

pub trait Transport: Send + Sync {
    /// Sends one request and returns the final status code after redirects.
    fn send(
        &self,
        method: Method,
        url: &Url,
    ) -> impl Future<Output = Result<u16, TransportError>> + Send;
}

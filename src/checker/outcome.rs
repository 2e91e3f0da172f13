// src/checker/outcome.rs
// =============================================================================
// The closed set of things that can happen when a URL is probed, and the one
// function that turns a raw transport answer into it.
//
// Nothing here is an error in the Rust sense: every variant is a normal value
// that ends up inside a LinkResult.
// =============================================================================

use crate::model::StatusKind;

use super::transport::TransportError;

/// Classified answer for one distinct URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Final response was 2xx (possibly after following redirects)
    Ok(u16),
    /// Final response was anything else
    HttpError(u16),
    /// DNS failure, refused connection, redirect loop, dropped connection
    Unreachable,
    /// No answer within the configured timeout
    Timeout,
    /// Certificate or TLS handshake failure
    TlsError,
    /// Not an http(s) URL with a host; never sent to the network
    InvalidUrl,
}

impl ProbeOutcome {
    pub fn status_kind(&self) -> StatusKind {
        match self {
            ProbeOutcome::Ok(_) => StatusKind::Ok,
            _ => StatusKind::Broken,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Ok(status) | ProbeOutcome::HttpError(status) => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable reason for a broken link.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            ProbeOutcome::Ok(_) => None,
            ProbeOutcome::HttpError(_) => Some("http_error"),
            ProbeOutcome::Unreachable => Some("unreachable"),
            ProbeOutcome::Timeout => Some("timeout"),
            ProbeOutcome::TlsError => Some("ssl_error"),
            ProbeOutcome::InvalidUrl => Some("invalid_url"),
        }
    }
}

/// Classifies the final transport answer for a URL, first match wins.
pub fn classify(answer: Result<u16, TransportError>) -> ProbeOutcome {
    match answer {
        Ok(status) if (200..300).contains(&status) => ProbeOutcome::Ok(status),
        Ok(status) => ProbeOutcome::HttpError(status),
        Err(TransportError::Timeout) => ProbeOutcome::Timeout,
        Err(TransportError::Tls(_)) => ProbeOutcome::TlsError,
        // A GET that is still rejected means the host never answered properly
        Err(TransportError::Unreachable(_)) | Err(TransportError::Rejected(_)) => {
            ProbeOutcome::Unreachable
        }
    }
}

/// HEAD answers that mean "this server does not do HEAD, ask again with GET".
pub fn disallows_head(status: u16) -> bool {
    matches!(status, 403 | 405 | 501)
}

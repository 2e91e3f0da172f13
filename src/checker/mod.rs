// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - engine: LinkChecker, the bounded concurrent validation engine
// - transport: the Transport trait the engine sends requests through
// - http: the reqwest-backed Transport used in production
// - outcome: the closed ProbeOutcome set and its classification
// - normalize: the URL key used to probe each distinct URL once
// =============================================================================

mod engine;
mod http;
mod normalize;
mod outcome;
mod transport;

pub use engine::{CheckedUrl, LinkChecker, Progress};
pub use http::HttpTransport;
pub use normalize::normalize_url;
pub use outcome::ProbeOutcome;
pub use transport::{Method, Transport, TransportError};

#[cfg(test)]
pub(crate) use engine::tests::FakeTransport;

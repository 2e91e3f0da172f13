// src/checker/normalize.rs
// =============================================================================
// URL normalization: the deduplication key for checking.
//
// Two references with the same normalized URL are probed once. The url crate
// already lowercases scheme and host, drops default ports and turns an empty
// path into "/"; on top of that the fragment is removed, since "#section"
// never reaches the server.
// =============================================================================

use url::Url;

/// Returns the dedup key for a raw URL.
///
/// Unparseable input is returned trimmed, so it still gets exactly one
/// (network-free) `invalid_url` classification.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

/// Parses a URL the checker is allowed to send: http(s) with a non-empty host.
pub fn parse_target(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

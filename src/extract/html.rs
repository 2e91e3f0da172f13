// src/extract/html.rs
// =============================================================================
// This module extracts links from HTML files.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// The DOM does not remember source positions, so each URL's line is found by
// searching the raw text forward from the previous match. Links inside one
// document come out in document order, which keeps that search monotonic.
// =============================================================================

use scraper::{Html, Selector};

use super::{is_http_link, line_at};

// Every element/attribute pair that can point at another resource
const LINK_SELECTOR: &str =
    "a[href], link[href], area[href], img[src], script[src], iframe[src], source[src]";

// Extracts all absolute HTTP/HTTPS links from HTML content
//
// Relative links are skipped: a file on disk has no base URL to resolve them
// against.
//
// Returns: (url, 1-based line) pairs in document order
pub fn extract_html_links(html: &str) -> Vec<(String, usize)> {
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return links;
    };
    let document = Html::parse_document(html);

    // Byte offset in `html` just past the previous match
    let mut cursor = 0;

    for element in document.select(&selector) {
        let value = element.value();
        let Some(url) = value.attr("href").or_else(|| value.attr("src")) else {
            continue;
        };

        let url = url.trim();
        if !is_http_link(url) {
            continue;
        }

        // Entity-encoded URLs (&amp;) will not be found verbatim; they get
        // the line of the previous link instead.
        let offset = match html[cursor..].find(url) {
            Some(pos) => {
                let start = cursor + pos;
                cursor = start + url.len();
                start
            }
            None => cursor,
        };

        links.push((url.to_string(), line_at(html, offset)));
    }

    links
}

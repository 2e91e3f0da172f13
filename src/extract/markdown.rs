// src/extract/markdown.rs
// =============================================================================
// This module extracts links from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows CommonMark
// - Can report the byte range of every event (into_offset_iter), which is
//   how we get line numbers
//
// Inline links, reference-style links, autolinks and images are all reported,
// and so are bare URLs in prose, code spans, code blocks and inline HTML. A URL is
// reported once per line.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};
use std::collections::HashSet;

use super::text::extract_text_links;
use super::{is_http_link, line_at};

#[derive(Default)]
struct Found {
    links: Vec<(String, usize)>,
    seen: HashSet<(String, usize)>,
}

impl Found {
    fn push(&mut self, url: String, line: usize) {
        if self.seen.insert((url.clone(), line)) {
            self.links.push((url, line));
        }
    }

    // Bare URLs in `text`, whose first line is `first_line` of the document
    fn scan(&mut self, text: &str, first_line: usize) {
        for (url, line) in extract_text_links(text) {
            self.push(url, first_line + line - 1);
        }
    }
}

// Extracts all HTTP/HTTPS links from Markdown text
//
// Returns: (url, 1-based line) pairs in document order
//
// Example input:
//   "Check out [Rust](https://www.rust-lang.org)!"
//
// Example output:
//   vec![("https://www.rust-lang.org", 1)]
pub fn extract_markdown_links(markdown: &str) -> Vec<(String, usize)> {
    let mut found = Found::default();
    // pulldown-cmark may split one run of text into several Text events, so
    // adjacent ones are joined before looking for URLs: (text, start offset)
    let mut pending: Option<(String, usize)> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        if let Event::Text(text) = &event {
            pending
                .get_or_insert_with(|| (String::new(), range.start))
                .0
                .push_str(text);
            continue;
        }
        if let Some((text, start)) = pending.take() {
            found.scan(&text, line_at(markdown, start));
        }

        match event {
            // In pulldown-cmark 0.9, Link and Image are Tag::Link(link_type, dest_url, title)
            Event::Start(Tag::Link(_, dest_url, _) | Tag::Image(_, dest_url, _)) => {
                // Skip mailto:, tel:, relative paths, anchors
                let url = dest_url.trim();
                if is_http_link(url) {
                    found.push(url.to_string(), line_at(markdown, range.start));
                }
            }
            Event::Code(text) | Event::Html(text) => {
                found.scan(&text, line_at(markdown, range.start));
            }
            _ => {}
        }
    }
    if let Some((text, start)) = pending {
        found.scan(&text, line_at(markdown, start));
    }

    found.links
}

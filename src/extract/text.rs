// src/extract/text.rs
// =============================================================================
// Bare URL extraction for files without link syntax (txt, json, js, ts...).
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Constant pattern, compiling it cannot fail
    PATTERN.get_or_init(|| Regex::new(r#"https?://[^\s<>"'`()\[\]{}]+"#).expect("valid url regex"))
}

// Punctuation that ends a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

pub fn extract_text_links(text: &str) -> Vec<(String, usize)> {
    text.lines()
        .enumerate()
        .flat_map(|(index, line)| {
            url_pattern().find_iter(line).filter_map(move |m| {
                let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
                // "http://" alone is not a link
                (url.len() > "http://".len()).then(|| (url.to_string(), index + 1))
            })
        })
        .collect()
}

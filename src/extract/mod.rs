// src/extract/mod.rs
// =============================================================================
// Turns scanned files into LinkReferences.
//
// Submodules:
// - markdown: links and images in .md / .markdown (pulldown-cmark)
// - html: href/src attributes in .html / .htm (scraper)
// - text: bare URLs in everything else (regex)
//
// References come out in file order, then in line order within a file. That
// order is the "scan order" the final report follows.
// =============================================================================

mod html;
mod markdown;
mod text;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::model::LinkReference;

use html::extract_html_links;
use markdown::extract_markdown_links;
use text::extract_text_links;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Markdown,
    Html,
    Text,
}

impl FileKind {
    fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("md" | "markdown") => FileKind::Markdown,
            Some("html" | "htm") => FileKind::Html,
            _ => FileKind::Text,
        }
    }
}

/// Reads `root/relative` and extracts its links. The reference's
/// source_file is the relative path.
pub fn extract_file(root: &Path, relative: &Path) -> Result<Vec<LinkReference>> {
    let full = root.join(relative);
    let bytes = fs::read(&full).with_context(|| format!("failed to read {}", full.display()))?;
    // A stray invalid byte must not hide the rest of the file's links
    let content = String::from_utf8_lossy(&bytes);
    Ok(extract_from_str(&content, relative))
}

pub fn extract_from_str(content: &str, source_file: &Path) -> Vec<LinkReference> {
    let links = match FileKind::of(source_file) {
        FileKind::Markdown => extract_markdown_links(content),
        FileKind::Html => extract_html_links(content),
        FileKind::Text => extract_text_links(content),
    };

    links
        .into_iter()
        .map(|(url, line)| LinkReference::new(url, source_file, line))
        .collect()
}

// Only absolute web links are extracted; mailto:, tel:, javascript:,
// relative paths and anchors are not our business.
fn is_http_link(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// 1-based line number of a byte offset
fn line_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_dispatch_by_extension() {
        let md = extract_from_str("[a](https://a.example/)", Path::new("README.md"));
        assert_eq!(md, vec![LinkReference::new("https://a.example/", "README.md", 1)]);

        let html = extract_from_str(r#"<a href="https://b.example/">b</a>"#, Path::new("index.HTML"));
        assert_eq!(html[0].url, "https://b.example/");

        // Markdown syntax in a .txt file is just text
        let txt = extract_from_str("[a](https://c.example/)", Path::new("notes.txt"));
        assert_eq!(txt[0].url, "https://c.example/");
    }

    #[test]
    fn test_extract_file_uses_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(
            dir.path().join("docs/guide.md"),
            "intro\n\n[api](https://api.example.com)\n",
        )
        .unwrap();

        let refs = extract_file(dir.path(), Path::new("docs/guide.md")).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].source_file, PathBuf::from("docs/guide.md"));
        assert_eq!(refs[0].line_number, 3);
    }

    #[test]
    fn test_invalid_utf8_does_not_hide_links() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = b"caf\xe9 menu\n".to_vec();
        contents.extend_from_slice(b"see https://menu.example/\n");
        std::fs::write(dir.path().join("notes.txt"), contents).unwrap();

        let refs = extract_file(dir.path(), Path::new("notes.txt")).unwrap();
        assert_eq!(refs, vec![LinkReference::new("https://menu.example/", "notes.txt", 2)]);
    }

    #[test]
    fn test_is_http_link() {
        assert!(is_http_link("https://example.com"));
        assert!(is_http_link("HTTP://EXAMPLE.COM"));
        assert!(!is_http_link("mailto:a@b.c"));
        assert!(!is_http_link("./docs/x.md"));
        assert!(!is_http_link("#top"));
    }

    #[test]
    fn test_line_at() {
        let text = "a\nb\nc";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 2), 2);
        assert_eq!(line_at(text, 4), 3);
        assert_eq!(line_at(text, 100), 3);
    }
}

// src/scan/mod.rs
// =============================================================================
// This module finds the files whose links should be checked.
//
// How it works:
// 1. Walk the project root with walkdir, sorted by file name so every run
//    sees the same order
// 2. Prune any directory matching an exclude_path pattern (its whole subtree
//    is skipped, nothing below it is even read)
// 3. Keep regular, non-hidden files with a supported extension that do not
//    match an exclude_path pattern themselves
//
// A pattern matches either a single path component (`node_modules`,
// `*.draft.md`) or the whole root-relative path (`docs/archive/*`). A trailing
// `/` makes a pattern directory-only.
// =============================================================================

use globset::{GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::compile_glob;
use crate::error::ConfigError;

pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "md", "markdown", "html", "htm", "json", "txt", "js", "jsx", "ts", "tsx",
];

/// Compiled exclude_path patterns.
pub struct PathFilter {
    any: GlobSet,
    dir_only: GlobSet,
}

impl PathFilter {
    pub fn new(patterns: &BTreeSet<String>) -> Result<Self, ConfigError> {
        let mut any = GlobSetBuilder::new();
        let mut dir_only = GlobSetBuilder::new();

        for pattern in patterns {
            match pattern.strip_suffix('/') {
                Some(dir) => dir_only.add(compile_glob(dir)?),
                None => any.add(compile_glob(pattern)?),
            };
        }

        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|source| ConfigError::InvalidPattern {
                pattern: "<exclude_paths>".to_string(),
                source,
            })
        };

        Ok(Self {
            any: build(any)?,
            dir_only: build(dir_only)?,
        })
    }

    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        let matches = |set: &GlobSet| {
            set.is_match(relative)
                || relative.file_name().is_some_and(|name| set.is_match(name))
        };
        matches(&self.any) || (is_dir && matches(&self.dir_only))
    }
}

/// Returns the root-relative paths of every file to extract links from.
pub fn scan_files(root: &Path, filter: &PathFilter) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_pruned(root, entry, filter));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || is_hidden(&entry) || !has_supported_extension(entry.path()) {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    debug!(count = files.len(), root = %root.display(), "scan finished");
    files
}

fn is_pruned(root: &Path, entry: &DirEntry, filter: &PathFilter) -> bool {
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    filter.is_excluded(relative, entry.file_type().is_dir())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

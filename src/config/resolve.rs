// src/config/resolve.rs
// =============================================================================
// Turns every configuration source into one Settings value.
//
// Sources, highest precedence first:
//   1. CLI overrides (Overrides)
//   2. linkguard.config.json (or the file named with --config)
//   3. built-in defaults
//
// Scalar fields take the first source that sets them. Pattern lists
// (exclude_url_patterns, exclude_path_patterns) are the union of all sources,
// including the ignore file (.linkguardignore, or every .gitignore as a
// fallback).
//
// Any problem here is fatal: the run aborts before a single probe is sent.
// =============================================================================

use globset::Glob;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::settings::{Mode, Settings, ViolationPolicy};
use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "linkguard.config.json";
pub const IGNORE_FILE_NAME: &str = ".linkguardignore";
const FALLBACK_IGNORE_FILE_NAME: &str = ".gitignore";

/// Partial settings coming from the command line.
///
/// `None` / empty means "not given on the command line".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<Mode>,
    pub timeout_seconds: Option<u64>,
    pub concurrency_limit: Option<usize>,
    pub exclude_url_patterns: Vec<String>,
    pub exclude_path_patterns: Vec<String>,
    pub extra_headers: Vec<(String, String)>,
    pub strict_ssl: Option<bool>,
    pub fail_on_violations: Option<bool>,
}

// Shape of linkguard.config.json. Unknown keys are ignored, missing keys
// fall through to the defaults. Numbers are read as i64 so that zero and
// negative values produce a readable error instead of a serde one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    mode: Option<String>,
    timeout: Option<i64>,
    concurrency: Option<i64>,
    exclude_urls: Vec<String>,
    exclude_paths: Vec<String>,
    headers: BTreeMap<String, String>,
    strict_ssl: Option<bool>,
    fail_on_violations: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ConfigResolver {
    root: PathBuf,
    config_file: Option<PathBuf>,
    overrides: Overrides,
}

impl ConfigResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_file: None,
            overrides: Overrides::default(),
        }
    }

    /// Use an explicit config file instead of `<root>/linkguard.config.json`.
    /// Unlike the default location, an explicit file must exist.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let file = self.load_file_config()?;
        let cli = &self.overrides;
        let mut settings = Settings::default();

        if let Some(mode) = cli.mode {
            settings.mode = mode;
        } else if let Some(mode) = &file.mode {
            settings.mode = mode.parse()?;
        }

        if let Some(timeout) = cli.timeout_seconds {
            settings.timeout_seconds = positive("timeout", i64::try_from(timeout).unwrap_or(i64::MAX))?;
        } else if let Some(timeout) = file.timeout {
            settings.timeout_seconds = positive("timeout", timeout)?;
        }

        if let Some(limit) = cli.concurrency_limit {
            let limit = positive("concurrency", i64::try_from(limit).unwrap_or(i64::MAX))?;
            settings.concurrency_limit = usize::try_from(limit).unwrap_or(usize::MAX);
        } else if let Some(limit) = file.concurrency {
            let limit = positive("concurrency", limit)?;
            settings.concurrency_limit = usize::try_from(limit).unwrap_or(usize::MAX);
        }

        if let Some(strict) = cli.strict_ssl.or(file.strict_ssl) {
            settings.strict_ssl = strict;
        }

        if let Some(fail) = cli.fail_on_violations.or(file.fail_on_violations) {
            settings.violation_policy = if fail {
                ViolationPolicy::Fail
            } else {
                ViolationPolicy::Warn
            };
        }

        // Pattern lists: union of defaults, file, ignore file and CLI
        settings.exclude_url_patterns.extend(file.exclude_urls);
        settings
            .exclude_url_patterns
            .extend(cli.exclude_url_patterns.iter().cloned());

        settings.exclude_path_patterns.extend(file.exclude_paths);
        settings.exclude_path_patterns.extend(self.load_ignore_patterns());
        settings
            .exclude_path_patterns
            .extend(cli.exclude_path_patterns.iter().cloned());

        // Headers: file first, CLI replaces entries with the same name
        settings.extra_headers = file.headers;
        for (name, value) in &cli.extra_headers {
            settings.extra_headers.insert(name.clone(), value.clone());
        }

        validate(&settings)?;
        debug!(?settings, "configuration resolved");
        Ok(settings)
    }

    fn load_file_config(&self) -> Result<FileConfig, ConfigError> {
        let (path, required) = match &self.config_file {
            Some(path) => (path.clone(), true),
            None => (self.root.join(CONFIG_FILE_NAME), false),
        };

        if !required && !path.exists() {
            return Ok(FileConfig::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    // .linkguardignore wins outright; otherwise every .gitignore below the
    // root contributes. Unreadable ignore files are skipped with a warning.
    fn load_ignore_patterns(&self) -> Vec<String> {
        let primary = self.root.join(IGNORE_FILE_NAME);
        if primary.is_file() {
            return read_ignore_file(&primary);
        }

        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file() && entry.file_name() == FALLBACK_IGNORE_FILE_NAME
            })
            .flat_map(|entry| read_ignore_file(entry.path()))
            .collect()
    }
}

fn read_ignore_file(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(text) => parse_ignore_patterns(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable ignore file");
            Vec::new()
        }
    }
}

/// Parses ignore-file text: one glob per line, blank lines and `#` comments
/// skipped. A leading `!` is dropped (negation is not supported, the pattern
/// is kept as a plain exclude). A trailing `/` is preserved: it marks a
/// directory-only pattern.
pub fn parse_ignore_patterns(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.strip_prefix('!').unwrap_or(line).trim())
        .filter(|line| !line.is_empty() && *line != "/")
        .map(str::to_string)
        .collect()
}

/// Splits a `Name: value` header given on the command line.
pub fn parse_header(raw: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn positive(field: &'static str, value: i64) -> Result<u64, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    // value > 0 here, so the conversion cannot fail
    Ok(value.unsigned_abs())
}

// Compile every glob and header once so that mistakes surface before any
// network traffic.
fn validate(settings: &Settings) -> Result<(), ConfigError> {
    for pattern in &settings.exclude_url_patterns {
        compile_glob(pattern)?;
    }
    for pattern in &settings.exclude_path_patterns {
        compile_glob(pattern.trim_end_matches('/'))?;
    }
    for (name, value) in &settings.extra_headers {
        let bad = || ConfigError::InvalidHeader(format!("{name}: {value}"));
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| bad())?;
        HeaderValue::from_str(value).map_err(|_| bad())?;
    }
    Ok(())
}

pub(crate) fn compile_glob(pattern: &str) -> Result<Glob, ConfigError> {
    Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_any_files() {
        let dir = project();
        let settings = ConfigResolver::new(dir.path()).resolve().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = project();
        write(
            &dir,
            CONFIG_FILE_NAME,
            r#"{"mode": "prod", "timeout": 20, "concurrency": 100, "unknown_key": true}"#,
        );

        let settings = ConfigResolver::new(dir.path()).resolve().unwrap();
        assert_eq!(settings.mode, Mode::Prod);
        assert_eq!(settings.timeout_seconds, 20);
        assert_eq!(settings.concurrency_limit, 100);
    }

    #[test]
    fn test_cli_beats_config_file_per_field() {
        let dir = project();
        write(&dir, CONFIG_FILE_NAME, r#"{"mode": "dev", "timeout": 7}"#);

        let overrides = Overrides {
            mode: Some(Mode::Prod),
            concurrency_limit: Some(3),
            ..Overrides::default()
        };
        let settings = ConfigResolver::new(dir.path())
            .with_overrides(overrides)
            .resolve()
            .unwrap();

        assert_eq!(settings.mode, Mode::Prod);
        assert_eq!(settings.timeout_seconds, 7);
        assert_eq!(settings.concurrency_limit, 3);
    }

    #[test]
    fn test_pattern_lists_are_unioned_across_sources() {
        let dir = project();
        write(
            &dir,
            CONFIG_FILE_NAME,
            r#"{"exclude_urls": ["https://example.com/*"], "exclude_paths": ["drafts/"]}"#,
        );
        write(&dir, IGNORE_FILE_NAME, "*.draft.md\n");

        let overrides = Overrides {
            exclude_url_patterns: vec!["http://internal.*".to_string()],
            exclude_path_patterns: vec!["tmp/".to_string()],
            ..Overrides::default()
        };
        let settings = ConfigResolver::new(dir.path())
            .with_overrides(overrides)
            .resolve()
            .unwrap();

        assert!(settings.exclude_url_patterns.contains("https://example.com/*"));
        assert!(settings.exclude_url_patterns.contains("http://internal.*"));
        for expected in ["drafts/", "*.draft.md", "tmp/", "node_modules/"] {
            assert!(
                settings.exclude_path_patterns.contains(expected),
                "missing {expected}"
            );
        }
    }

    #[test]
    fn test_ignore_file_parsing() {
        let patterns = parse_ignore_patterns("node_modules\n*.draft.md\n# Comment\n\ndist/\n!keep.md\n");
        assert_eq!(patterns, vec!["node_modules", "*.draft.md", "dist/", "keep.md"]);
    }

    #[test]
    fn test_linkguardignore_takes_priority_over_gitignore() {
        let dir = project();
        write(&dir, ".gitignore", ".venv\ncoverage\n");
        write(&dir, IGNORE_FILE_NAME, "*.draft.md\n");

        let settings = ConfigResolver::new(dir.path()).resolve().unwrap();
        assert!(settings.exclude_path_patterns.contains("*.draft.md"));
        assert!(!settings.exclude_path_patterns.contains("coverage"));
    }

    #[test]
    fn test_gitignore_fallback_is_collected_recursively() {
        let dir = project();
        write(&dir, ".gitignore", "*.log\n");
        write(&dir, "frontend/.gitignore", ".cache/\n");
        write(&dir, "backend/.gitignore", "*.pyc\n");

        let settings = ConfigResolver::new(dir.path()).resolve().unwrap();
        for expected in ["*.log", ".cache/", "*.pyc"] {
            assert!(settings.exclude_path_patterns.contains(expected));
        }
    }

    #[test]
    fn test_malformed_config_file_is_fatal() {
        let dir = project();
        write(&dir, CONFIG_FILE_NAME, "{invalid json");

        let err = ConfigResolver::new(dir.path()).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_wrong_value_type_is_fatal() {
        let dir = project();
        write(&dir, CONFIG_FILE_NAME, r#"{"timeout": "soon"}"#);

        let err = ConfigResolver::new(dir.path()).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_non_positive_numbers_are_fatal() {
        let dir = project();
        write(&dir, CONFIG_FILE_NAME, r#"{"concurrency": 0}"#);
        let err = ConfigResolver::new(dir.path()).resolve().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "concurrency",
                value: 0
            }
        ));

        let dir = project();
        write(&dir, CONFIG_FILE_NAME, r#"{"timeout": -5}"#);
        let err = ConfigResolver::new(dir.path()).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "timeout", .. }));

        let overrides = Overrides {
            timeout_seconds: Some(0),
            ..Overrides::default()
        };
        let err = ConfigResolver::new(project().path())
            .with_overrides(overrides)
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "timeout", .. }));
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = project();
        let err = ConfigResolver::new(dir.path())
            .with_config_file(dir.path().join("missing.json"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_mode_and_glob_are_fatal() {
        let dir = project();
        write(&dir, CONFIG_FILE_NAME, r#"{"mode": "staging"}"#);
        let err = ConfigResolver::new(dir.path()).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMode(_)));

        let dir = project();
        write(&dir, CONFIG_FILE_NAME, r#"{"exclude_urls": ["https://[bad"]}"#);
        let err = ConfigResolver::new(dir.path()).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_headers_merge_with_cli_precedence() {
        let dir = project();
        write(
            &dir,
            CONFIG_FILE_NAME,
            r#"{"headers": {"Authorization": "Bearer file", "X-Team": "docs"}}"#,
        );
        let overrides = Overrides {
            extra_headers: vec![parse_header("Authorization: Bearer cli").unwrap()],
            ..Overrides::default()
        };

        let settings = ConfigResolver::new(dir.path())
            .with_overrides(overrides)
            .resolve()
            .unwrap();
        assert_eq!(settings.extra_headers["Authorization"], "Bearer cli");
        assert_eq!(settings.extra_headers["X-Team"], "docs");
    }

    #[test]
    fn test_parse_header_rejects_missing_colon() {
        assert!(parse_header("NoColonHere").is_err());
        assert!(parse_header(": value").is_err());
        assert_eq!(
            parse_header("Accept:text/html").unwrap(),
            ("Accept".to_string(), "text/html".to_string())
        );
    }

    #[test]
    fn test_fail_on_violations_maps_to_policy() {
        let dir = project();
        write(&dir, CONFIG_FILE_NAME, r#"{"fail_on_violations": true}"#);
        let settings = ConfigResolver::new(dir.path()).resolve().unwrap();
        assert_eq!(settings.violation_policy, ViolationPolicy::Fail);
    }
}

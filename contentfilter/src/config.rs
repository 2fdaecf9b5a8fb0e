//! Configuration types.
//!
//! Split into filter configuration (what the pipeline accepts) and
//! filesystem source configuration (how batch validation finds files).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// What happens to content whose type has no registered filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum FallbackPolicy {
    /// Accept it and render it as escaped text without a stylesheet.
    PassThrough,
    /// Treat it as `text/plain` (default).
    #[default]
    Text,
    /// Reject it with `InvalidContentType`.
    None,
}

/// Filter pipeline configuration, usually loaded from JSON.
///
/// ```json
/// { "allowed_classes": ["code", "note"], "fallback": "text" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ContentFilterConfig {
    /// CSS classes XHTML authors may use; all others are stripped.
    pub allowed_classes: HashSet<String>,
    /// Handling of unregistered content types.
    pub fallback: FallbackPolicy,
}

/// Classes allowed when the configuration does not name any.
pub const DEFAULT_ALLOWED_CLASSES: [&str; 4] = ["lang-xml", "lang-js", "lang-css", "external"];

impl Default for ContentFilterConfig {
    fn default() -> Self {
        Self {
            allowed_classes: DEFAULT_ALLOWED_CLASSES.iter().map(|&c| c.to_owned()).collect(),
            fallback: FallbackPolicy::default(),
        }
    }
}

impl ContentFilterConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or contains unknown fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Filesystem-specific source options for batch validation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct FsSourceConfig {
    /// Paths to scan (files or directories). Required, must be non-empty.
    pub paths: Vec<PathBuf>,
    /// Exclude patterns (glob format).
    pub exclude: Vec<String>,
    /// Maximum file size in bytes (default: 1 MB).
    pub max_file_size: u64,
    /// Whether to follow symbolic links (default: `false`).
    pub follow_links: bool,
    /// Maximum directory traversal depth (default: 64).
    pub max_depth: usize,
}

impl Default for FsSourceConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            exclude: Vec::new(),
            max_file_size: 1_048_576,
            follow_links: false,
            max_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContentFilterConfig::default();
        let mut classes: Vec<&str> = config.allowed_classes.iter().map(String::as_str).collect();
        classes.sort_unstable();
        assert_eq!(classes, ["external", "lang-css", "lang-js", "lang-xml"]);
        assert_eq!(config.fallback, FallbackPolicy::Text);
    }

    #[test]
    fn test_from_json() {
        let config =
            ContentFilterConfig::from_json(r#"{"allowed_classes": ["code"], "fallback": "none"}"#)
                .unwrap();
        assert!(config.allowed_classes.contains("code"));
        assert_eq!(config.fallback, FallbackPolicy::None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ContentFilterConfig::from_json(r#"{"fallback": "pass-through"}"#).unwrap();
        assert_eq!(config.fallback, FallbackPolicy::PassThrough);
        assert!(config.allowed_classes.contains("lang-xml"));

        let config = ContentFilterConfig::from_json(r#"{"allowed_classes": []}"#).unwrap();
        assert!(config.allowed_classes.is_empty());
        assert_eq!(config.fallback, FallbackPolicy::Text);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        assert!(ContentFilterConfig::from_json(r#"{"allowed_class": []}"#).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err =
            ContentFilterConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

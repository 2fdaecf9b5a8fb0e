//! Error types for content validation and rendering.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Leading diagnostic codes emitted by schema validators (e.g. `cvc-complex-type.2.4.a: `).
static VALIDATOR_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^cvc[A-Za-z0-9\-.]+:\s*") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid validator code regex: {err}"),
    }
});

/// Trailing "expected element" hints that only make sense to schema authors.
static EXPECTED_HINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"One of '(.)*' is expected.$") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid expected-hint regex: {err}"),
    }
});

/// Errors raised while validating or formatting content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    /// No filter can handle the content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// The content failed to parse. Line and column are 1-based and refer to
    /// the user's input, not to any synthetic prefix.
    #[error("Line {line}, column {column}: {message}")]
    InvalidContent {
        /// Cleaned, user-facing description of the problem.
        message: String,
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
    },

    /// Reading the content stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transforming or serializing validated content failed.
    #[error("Transform error: {0}")]
    Transform(String),
}

impl ContentError {
    /// Build an `InvalidContent` error, cleaning validator noise out of the message.
    #[must_use]
    pub fn invalid_content(message: &str, line: usize, column: usize) -> Self {
        Self::InvalidContent {
            message: clean_message(message),
            line,
            column,
        }
    }

    /// Line and column of an `InvalidContent` error.
    #[must_use]
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::InvalidContent { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for ContentError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Transform(err.to_string())
    }
}

/// Strip schema-validator codes and expectation hints from a parser message.
#[must_use]
pub fn clean_message(message: &str) -> String {
    let message = VALIDATOR_CODE_PATTERN.replace(message, "");
    EXPECTED_HINT_PATTERN.replace(&message, "").into_owned()
}

/// The kind of scan-level failure that prevented a file from being validated.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScanErrorKind {
    /// An I/O error occurred while reading the file.
    IoError,
    /// The file exceeded the configured maximum size limit.
    FileTooLarge,
    /// The file content is not valid UTF-8.
    InvalidEncoding,
    /// No filter is registered for the file's content type.
    UnsupportedContentType,
    /// A directory traversal error (permission denied, loop detected, etc.).
    WalkError,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
}

/// A file that could not be validated at all.
///
/// Distinct from `ValidationError`, which means the file was read and its
/// content was rejected.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ScanError {
    /// The file path that could not be scanned.
    pub file: PathBuf,
    /// The kind of failure.
    pub kind: ScanErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ScanError {
    /// Format the error for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}: [scan error] {}", self.file.display(), self.message)
    }
}

/// Content rejected by its filter.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ValidationError {
    /// File path where the error was found
    pub file: PathBuf,
    /// Content type the file was validated as
    pub content_type: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Human-readable error description
    pub error: String,
}

impl ValidationError {
    /// Format the error as `{file}:{line}:{column}: {error} ({content_type})`.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!(
            "{}:{}:{}: {} ({})",
            self.file.display(),
            self.line,
            self.column,
            self.error,
            self.content_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_message_strips_validator_code() {
        let cleaned = clean_message("cvc-complex-type.2.4.a: Invalid content was found.");
        assert_eq!(cleaned, "Invalid content was found.");
    }

    #[test]
    fn test_clean_message_strips_expected_hint() {
        let cleaned =
            clean_message("Invalid content starting with 'foo'. One of '{p, div}' is expected.");
        assert_eq!(cleaned, "Invalid content starting with 'foo'. ");
    }

    #[test]
    fn test_clean_message_leaves_plain_messages() {
        assert_eq!(clean_message("unexpected end"), "unexpected end");
    }

    #[test]
    fn test_invalid_content_display() {
        let err = ContentError::invalid_content("cvc-foo.1: bad tag", 3, 7);
        assert_eq!(err.to_string(), "Line 3, column 7: bad tag");
        assert_eq!(err.location(), Some((3, 7)));
    }

    #[test]
    fn test_location_absent_for_other_errors() {
        let err = ContentError::InvalidContentType("bogus".to_owned());
        assert_eq!(err.location(), None);
    }

    #[test]
    fn test_format_validation_error() {
        let err = ValidationError {
            file: PathBuf::from("comments/42.xhtml"),
            content_type: "application/xhtml+xml".to_owned(),
            line: 2,
            column: 5,
            error: "unclosed tag".to_owned(),
        };

        let formatted = err.format_human_readable();
        assert_eq!(
            formatted,
            "comments/42.xhtml:2:5: unclosed tag (application/xhtml+xml)"
        );
    }

    #[test]
    fn test_format_scan_error() {
        let err = ScanError {
            file: PathBuf::from("a.txt"),
            kind: ScanErrorKind::FileTooLarge,
            message: "too big".to_owned(),
        };
        assert_eq!(err.format_human_readable(), "a.txt: [scan error] too big");
    }
}

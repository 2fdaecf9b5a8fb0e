//! First-diagnostic slot for XHTML validation.
//!
//! A parse may report several problems; only the first one is shown to the
//! user, positioned relative to their own input rather than the synthetic
//! prefix that framed it.

use crate::error::ContentError;

/// Severity of a parser diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recoverable oddity.
    Warning,
    /// Validity error.
    Error,
    /// Well-formedness error; parsing cannot continue.
    FatalError,
}

/// A recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity reported by the parser.
    pub severity: Severity,
    /// Parser message.
    pub message: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, adjusted for the prefix on line 1.
    pub column: usize,
}

/// Set-once slot holding the first diagnostic of a parse.
#[derive(Debug, Clone, Default)]
pub struct FirstError {
    prefix_len: usize,
    first: Option<Diagnostic>,
}

impl FirstError {
    /// Slot for content framed by a prefix of `prefix_len` characters on line 1.
    #[must_use]
    pub fn with_prefix_len(prefix_len: usize) -> Self {
        Self {
            prefix_len,
            first: None,
        }
    }

    /// Record a warning.
    pub fn warning(&mut self, message: &str, line: usize, column: usize) {
        self.record(Severity::Warning, message, line, column);
    }

    /// Record an error.
    pub fn error(&mut self, message: &str, line: usize, column: usize) {
        self.record(Severity::Error, message, line, column);
    }

    /// Record a fatal error.
    pub fn fatal_error(&mut self, message: &str, line: usize, column: usize) {
        self.record(Severity::FatalError, message, line, column);
    }

    fn record(&mut self, severity: Severity, message: &str, line: usize, column: usize) {
        if self.first.is_some() {
            return;
        }
        let column = if line == 1 {
            column.saturating_sub(self.prefix_len)
        } else {
            column
        };
        self.first = Some(Diagnostic {
            severity,
            message: message.to_owned(),
            line,
            column,
        });
    }

    /// The first recorded diagnostic.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.first.as_ref()
    }

    /// Message of the first diagnostic.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.first.as_ref().map(|d| d.message.as_str())
    }

    /// Line of the first diagnostic, 1 when none was recorded.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.first.as_ref().map_or(1, |d| d.line)
    }

    /// Column of the first diagnostic, 1 when none was recorded.
    #[must_use]
    pub fn column_number(&self) -> usize {
        self.first.as_ref().map_or(1, |d| d.column)
    }

    /// Convert the recorded diagnostic into `InvalidContent`, falling back to
    /// `fallback_message` at 1:1 when nothing was recorded.
    #[must_use]
    pub fn into_content_error(self, fallback_message: &str) -> ContentError {
        match self.first {
            Some(d) => ContentError::invalid_content(&d.message, d.line, d.column),
            None => ContentError::invalid_content(fallback_message, 1, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::xhtml::XHTML_PREFIX;

    #[test]
    fn test_warning() {
        let mut handler = FirstError::with_prefix_len(XHTML_PREFIX.len());
        handler.warning("warning", 2, 1);
        assert_eq!(handler.message(), Some("warning"));
        assert_eq!(handler.line_number(), 2);
        assert_eq!(handler.column_number(), 1);
        assert_eq!(handler.diagnostic().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn test_warning_line1_subtracts_prefix() {
        let mut handler = FirstError::with_prefix_len(XHTML_PREFIX.len());
        handler.warning("warning", 1, 100);
        assert_eq!(handler.line_number(), 1);
        assert_eq!(handler.column_number(), 100 - XHTML_PREFIX.len());
    }

    #[test]
    fn test_error() {
        let mut handler = FirstError::with_prefix_len(XHTML_PREFIX.len());
        handler.error("error", 2, 1);
        assert_eq!(handler.message(), Some("error"));
        assert_eq!(handler.diagnostic().unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_fatal_error() {
        let mut handler = FirstError::with_prefix_len(XHTML_PREFIX.len());
        handler.fatal_error("fatalerror", 2, 1);
        assert_eq!(handler.message(), Some("fatalerror"));
        assert_eq!(handler.line_number(), 2);
        assert_eq!(handler.column_number(), 1);
    }

    #[test]
    fn test_first_diagnostic_wins() {
        let mut handler = FirstError::with_prefix_len(0);
        handler.error("first", 3, 4);
        handler.fatal_error("second", 5, 6);
        assert_eq!(handler.message(), Some("first"));
        assert_eq!((handler.line_number(), handler.column_number()), (3, 4));
    }

    #[test]
    fn test_defaults_when_empty() {
        let handler = FirstError::with_prefix_len(10);
        assert_eq!(handler.message(), None);
        assert_eq!((handler.line_number(), handler.column_number()), (1, 1));
        let err = handler.into_content_error("boom");
        assert_eq!(err.location(), Some((1, 1)));
    }

    #[test]
    fn test_column_inside_prefix_saturates() {
        let mut handler = FirstError::with_prefix_len(10);
        handler.error("inside prefix", 1, 4);
        assert_eq!(handler.column_number(), 0);
    }
}

//! The fixed set of content types users can submit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// MIME type of plain text content.
pub const TEXT_PLAIN: &str = "text/plain";

/// MIME type of XHTML fragment content.
pub const APPLICATION_XHTML: &str = "application/xhtml+xml";

/// How raw content must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Plain text; line breaks are preserved, markup is escaped.
    #[serde(rename = "text/plain")]
    Text,
    /// A fragment of XHTML 1.0 markup.
    #[serde(rename = "application/xhtml+xml")]
    Xhtml,
}

impl ContentType {
    /// All supported content types.
    pub const ALL: [Self; 2] = [Self::Text, Self::Xhtml];

    /// The MIME string filters are registered under.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Text => TEXT_PLAIN,
            Self::Xhtml => APPLICATION_XHTML,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for ContentType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ct| ct.mime_type().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ContentError::InvalidContentType(format!("Unknown content type {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(ContentType::Text.mime_type(), "text/plain");
        assert_eq!(ContentType::Xhtml.mime_type(), "application/xhtml+xml");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "Application/XHTML+XML".parse::<ContentType>().unwrap(),
            ContentType::Xhtml
        );
        assert_eq!(" text/plain ".parse::<ContentType>().unwrap(), ContentType::Text);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "text/html".parse::<ContentType>().unwrap_err();
        assert!(matches!(err, ContentError::InvalidContentType(_)));
    }

    #[test]
    fn test_serde_uses_mime_string() {
        let json = serde_json::to_string(&ContentType::Xhtml).unwrap();
        assert_eq!(json, "\"application/xhtml+xml\"");
        let back: ContentType = serde_json::from_str("\"text/plain\"").unwrap();
        assert_eq!(back, ContentType::Text);
    }
}

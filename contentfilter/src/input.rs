//! Character sources handed to content readers.

use std::io::{self, Read};

/// A source of raw content for a single parse.
///
/// Owns (or borrows) a reader for the duration of one validate/format call.
/// Framed sources read a prefix, the content and a suffix back to back, which
/// lets fragments parse as standalone documents.
pub struct InputSource<'a> {
    reader: Box<dyn Read + 'a>,
}

impl<'a> InputSource<'a> {
    /// Wrap an arbitrary reader.
    #[must_use]
    pub fn from_reader<R: Read + 'a>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Read from a string slice.
    #[must_use]
    pub fn from_text(text: &'a str) -> Self {
        Self::from_reader(text.as_bytes())
    }

    /// Read `prefix`, then `content`, then `suffix`.
    #[must_use]
    pub fn framed(prefix: Option<&'a str>, content: &'a str, suffix: Option<&'a str>) -> Self {
        let prefix = prefix.unwrap_or_default().as_bytes();
        let suffix = suffix.unwrap_or_default().as_bytes();
        Self::from_reader(prefix.chain(content.as_bytes()).chain(suffix))
    }

    /// Consume the source into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails or yields invalid UTF-8.
    pub fn read_to_string(mut self) -> io::Result<String> {
        let mut buf = String::new();
        self.reader.read_to_string(&mut buf)?;
        Ok(buf)
    }

    /// Access the underlying reader.
    pub fn reader(&mut self) -> &mut (dyn Read + 'a) {
        self.reader.as_mut()
    }
}

impl<'a> From<&'a str> for InputSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::from_text(text)
    }
}

impl std::fmt::Debug for InputSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_reads_in_sequence() {
        let source = InputSource::framed(Some("<a>"), "body", Some("</a>"));
        assert_eq!(source.read_to_string().unwrap(), "<a>body</a>");
    }

    #[test]
    fn test_framed_without_markers() {
        let source = InputSource::framed(None, "plain", None);
        assert_eq!(source.read_to_string().unwrap(), "plain");
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let bytes: &[u8] = &[0x66, 0xff, 0x6f];
        let err = InputSource::from_reader(bytes).read_to_string().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}

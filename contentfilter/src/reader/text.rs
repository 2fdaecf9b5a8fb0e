//! Plain text reader.
//!
//! Emits `<text><line>..</line>..</text>`: one trimmed `line` element per
//! input line. `\r\n`, `\n` and a lone `\r` all end a line; a trailing line
//! terminator does not start an extra empty line.

use crate::error::ContentError;
use crate::handler::ContentHandler;
use crate::input::InputSource;
use crate::reader::XmlReader;

/// Root element emitted by the text reader.
pub const TEXT_ELEMENT: &str = "text";

/// Per-line element emitted by the text reader.
pub const LINE_ELEMENT: &str = "line";

/// Reads any character stream as plain text. All input is valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReader;

impl TextReader {
    /// Create a text reader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl XmlReader for TextReader {
    fn parse(
        &mut self,
        input: InputSource<'_>,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), ContentError> {
        let content = input.read_to_string()?;

        handler.start_document()?;
        handler.start_element(TEXT_ELEMENT, &[])?;
        for line in split_lines(&content) {
            handler.start_element(LINE_ELEMENT, &[])?;
            handler.characters(line.trim())?;
            handler.end_element(LINE_ELEMENT)?;
        }
        handler.end_element(TEXT_ELEMENT)?;
        handler.end_document()
    }
}

/// Split on `\r\n`, `\n` or `\r`.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let Some(i) = rest.find(['\r', '\n']) else {
            lines.push(rest);
            break;
        };
        lines.push(&rest[..i]);
        let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + terminator..];
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Attribute;

    /// Records events as `<name>text</name>` markup.
    #[derive(Default)]
    struct RecordingHandler {
        buf: String,
    }

    impl ContentHandler for RecordingHandler {
        fn start_document(&mut self) -> Result<(), ContentError> {
            self.buf.clear();
            Ok(())
        }

        fn start_element(&mut self, name: &str, _: &[Attribute]) -> Result<(), ContentError> {
            self.buf.push('<');
            self.buf.push_str(name);
            self.buf.push('>');
            Ok(())
        }

        fn end_element(&mut self, name: &str) -> Result<(), ContentError> {
            self.buf.push_str("</");
            self.buf.push_str(name);
            self.buf.push('>');
            Ok(())
        }

        fn characters(&mut self, text: &str) -> Result<(), ContentError> {
            self.buf.push_str(text);
            Ok(())
        }
    }

    fn parse(text: &str) -> String {
        let mut handler = RecordingHandler::default();
        TextReader::new()
            .parse(InputSource::from_text(text), &mut handler)
            .unwrap();
        handler.buf
    }

    #[test]
    fn test_parse_paragraphs() {
        assert_eq!(
            parse("First paragraph.\n\nSecond paragraph.\n"),
            "<text><line>First paragraph.</line><line></line><line>Second paragraph.</line></text>"
        );
    }

    #[test]
    fn test_parse_from_reader() {
        let bytes: &[u8] = b"  padded  \r\nnext";
        let mut handler = RecordingHandler::default();
        TextReader::new()
            .parse(InputSource::from_reader(bytes), &mut handler)
            .unwrap();
        assert_eq!(handler.buf, "<text><line>padded</line><line>next</line></text>");
    }

    #[test]
    fn test_markup_is_character_data() {
        assert_eq!(parse("<b>"), "<text><line><b></line></text>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), "<text></text>");
    }

    #[test]
    fn test_split_lines_mixed_terminators() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
    }
}

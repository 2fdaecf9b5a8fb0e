//! XHTML fragment filter.
//!
//! Fragments are framed by [`XHTML_PREFIX`] and [`XHTML_SUFFIX`] so they
//! parse as a complete XHTML document. Validation is strict: well-formed and
//! namespace-well-formed markup, a single `html` root holding exactly `head`
//! then `body`, XHTML-namespace elements of the XHTML 1.0 Transitional
//! vocabulary, and only predefined entities. Rendering goes through the
//! sanitizing `XhtmlReader`, so valid-but-unsafe markup is still stripped.

use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use url::Url;

use crate::error::ContentError;
use crate::error_handler::FirstError;
use crate::filter::ContentFilter;
use crate::position::LineIndex;
use crate::reader::policy::{NameBinding, is_xhtml_element};
use crate::reader::{XhtmlReader, XmlReader};
use crate::stylesheet::{Stylesheet, XhtmlToXhtml};

/// Markup prepended to XHTML fragments.
pub const XHTML_PREFIX: &str =
    "<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>Untitled</title></head><body>";

/// Markup appended to XHTML fragments.
pub const XHTML_SUFFIX: &str = "</body></html>";

/// Validates and sanitizes XHTML fragments.
#[derive(Debug, Clone)]
pub struct XhtmlFilter {
    allowed_classes: Arc<HashSet<String>>,
    templates: Arc<dyn Stylesheet>,
}

impl XhtmlFilter {
    /// Create a filter keeping only `allowed_classes` in `class` attributes.
    #[must_use]
    pub fn new(allowed_classes: HashSet<String>) -> Self {
        Self {
            allowed_classes: Arc::new(allowed_classes),
            templates: Arc::new(XhtmlToXhtml),
        }
    }

    /// CSS classes authors may use.
    #[must_use]
    pub fn allowed_classes(&self) -> &HashSet<String> {
        &self.allowed_classes
    }
}

impl Default for XhtmlFilter {
    fn default() -> Self {
        Self::new(HashSet::new())
    }
}

impl ContentFilter for XhtmlFilter {
    fn prefix(&self, _content_type: &str) -> Option<&str> {
        Some(XHTML_PREFIX)
    }

    fn suffix(&self, _content_type: &str) -> Option<&str> {
        Some(XHTML_SUFFIX)
    }

    fn xml_reader(
        &self,
        base_url: Option<&Url>,
        _content_type: &str,
    ) -> Result<Box<dyn XmlReader>, ContentError> {
        let reader = XhtmlReader::new(Arc::clone(&self.allowed_classes), base_url.cloned())
            .with_prefix_len(XHTML_PREFIX.len());
        Ok(Box::new(reader))
    }

    fn xsl_templates(&self, _content_type: &str) -> Option<Arc<dyn Stylesheet>> {
        Some(Arc::clone(&self.templates))
    }

    fn validate(&self, content_type: &str, content: &mut dyn Read) -> Result<(), ContentError> {
        let mut buf = String::new();
        content.read_to_string(&mut buf)?;

        let mut errors = FirstError::with_prefix_len(XHTML_PREFIX.len());
        check_document(&buf, &mut errors);
        match errors.diagnostic() {
            None => Ok(()),
            Some(diagnostic) => {
                tracing::debug!(
                    content_type,
                    line = diagnostic.line,
                    column = diagnostic.column,
                    message = %diagnostic.message,
                    "Rejected XHTML content"
                );
                Err(errors.into_content_error("Invalid XHTML content"))
            }
        }
    }
}

/// Children the `html` root must have, in order. Fragments may not close
/// the framing `body` and open elements of their own beside it.
const FRAME_CHILDREN: [&str; 2] = ["head", "body"];

const FRAME_MESSAGE: &str = "Element 'html' must contain 'head' followed by 'body'";

/// A problem found while walking the document.
#[derive(Debug)]
enum Problem {
    /// Validity error: well-formed, but not XHTML.
    Invalid(String),
    /// Well-formedness error.
    Fatal(String),
}

impl Problem {
    fn record(self, errors: &mut FirstError, line: usize, column: usize) {
        match self {
            Self::Invalid(message) => errors.error(&message, line, column),
            Self::Fatal(message) => errors.fatal_error(&message, line, column),
        }
    }
}

/// Walk the document, recording the first problem in `errors`.
fn check_document(content: &str, errors: &mut FirstError) {
    let index = LineIndex::new(content);
    let mut reader = NsReader::from_str(content);
    let mut walk = DocumentWalk::default();

    loop {
        let resolved = reader
            .read_resolved_event()
            .map(|(ns, event)| (NameBinding::from_resolved(&ns), event));
        let outcome = match resolved {
            Ok((binding, event)) => walk.step(&reader, &binding, &event),
            Err(err) => Err(Problem::Fatal(err.to_string())),
        };

        match outcome {
            Ok(true) => {}
            Ok(false) => return,
            Err(problem) => {
                let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
                let (line, column) = index.locate(content, offset);
                problem.record(errors, line, column);
                return;
            }
        }
    }
}

/// Structural state of a validation walk.
#[derive(Debug, Default)]
struct DocumentWalk {
    open: Vec<String>,
    seen_root: bool,
    frame_children: usize,
}

impl DocumentWalk {
    /// Check one event. Returns `false` at end of input.
    fn step(
        &mut self,
        reader: &NsReader<&[u8]>,
        binding: &NameBinding,
        event: &Event<'_>,
    ) -> Result<bool, Problem> {
        match event {
            Event::Start(start) => {
                let name = self.start(reader, binding, start)?;
                self.open.push(name);
            }
            Event::Empty(start) => {
                let name = self.start(reader, binding, start)?;
                if self.open.is_empty() {
                    return Err(Problem::Invalid(FRAME_MESSAGE.to_owned()));
                }
            }
            Event::End(_) => {
                if self.open.len() == 1 && self.frame_children < FRAME_CHILDREN.len() {
                    return Err(Problem::Invalid(FRAME_MESSAGE.to_owned()));
                }
                self.open.pop();
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| Problem::Fatal(e.to_string()))?;
                self.characters(&text)?;
            }
            Event::CData(data) => self.characters(&String::from_utf8_lossy(data))?,
            Event::Eof => {
                self.finish()?;
                return Ok(false);
            }
            _ => {}
        }
        Ok(true)
    }

    /// Check an element start, returning its local name.
    fn start(
        &mut self,
        reader: &NsReader<&[u8]>,
        binding: &NameBinding,
        start: &BytesStart<'_>,
    ) -> Result<String, Problem> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        match self.open.len() {
            0 => {
                if self.seen_root {
                    return Err(Problem::Fatal(format!(
                        "Element '{name}' follows the root element"
                    )));
                }
                self.seen_root = true;
                if name != "html" {
                    return Err(Problem::Invalid(format!(
                        "Root element must be 'html', found '{name}'"
                    )));
                }
            }
            1 => {
                let expected = FRAME_CHILDREN.get(self.frame_children).copied();
                self.frame_children += 1;
                if expected != Some(name.as_str()) {
                    return Err(Problem::Invalid(format!(
                        "Element '{name}' is not allowed here. {FRAME_MESSAGE}"
                    )));
                }
            }
            _ => {}
        }

        let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        match binding {
            NameBinding::Xhtml => {}
            NameBinding::UnknownPrefix(prefix) => {
                return Err(Problem::Fatal(NameBinding::unbound_prefix_message(
                    prefix, "element", &qname,
                )));
            }
            NameBinding::Foreign(_) | NameBinding::Unbound => {
                return Err(Problem::Invalid(format!(
                    "Element '{qname}' is not in the XHTML namespace"
                )));
            }
        }

        if !is_xhtml_element(&name) {
            return Err(Problem::Invalid(format!(
                "Element '{name}' is not allowed in XHTML"
            )));
        }
        check_attributes(reader, start)?;
        Ok(name)
    }

    fn characters(&self, text: &str) -> Result<(), Problem> {
        if text.chars().all(char::is_whitespace) {
            return Ok(());
        }
        match self.open.len() {
            0 => Err(Problem::Fatal(
                "Content is not allowed outside the root element".to_owned(),
            )),
            1 => Err(Problem::Invalid(
                "Text is not allowed directly inside 'html'".to_owned(),
            )),
            _ => Ok(()),
        }
    }

    fn finish(&self) -> Result<(), Problem> {
        if let Some(element) = self.open.last() {
            return Err(Problem::Fatal(format!(
                "Element '{element}' is not closed before end of document"
            )));
        }
        if !self.seen_root {
            return Err(Problem::Fatal("Document has no root element".to_owned()));
        }
        Ok(())
    }
}

/// Attributes must be well-formed, namespace-bound, free of `<` and use only
/// predefined or character entities.
fn check_attributes(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<(), Problem> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Problem::Fatal(e.to_string()))?;
        let qname = String::from_utf8_lossy(attr.key.as_ref()).into_owned();

        if let NameBinding::UnknownPrefix(prefix) =
            NameBinding::from_resolved(&reader.resolve_attribute(attr.key).0)
        {
            return Err(Problem::Fatal(NameBinding::unbound_prefix_message(
                &prefix, "attribute", &qname,
            )));
        }
        if attr.value.contains(&b'<') {
            return Err(Problem::Fatal(format!(
                "The value of attribute \"{qname}\" must not contain the '<' character"
            )));
        }
        attr.unescape_value().map_err(|e| Problem::Fatal(e.to_string()))?;
    }
    Ok(())
}

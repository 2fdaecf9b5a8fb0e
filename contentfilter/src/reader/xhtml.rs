//! Sanitizing XHTML reader.
//!
//! Parses well-formed, namespace-well-formed markup and forwards only allowed
//! elements and attributes to the downstream handler. Disallowed elements,
//! and elements bound to a foreign namespace, are dropped together with
//! everything inside them. Content whose root element is not `html` is
//! wrapped in synthetic `html`/`body` elements.

use std::collections::HashSet;
use std::sync::Arc;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use url::Url;

use crate::error::ContentError;
use crate::error_handler::FirstError;
use crate::handler::{Attribute, ContentHandler};
use crate::input::InputSource;
use crate::position::LineIndex;
use crate::reader::XmlReader;
use crate::reader::policy::{
    NameBinding, canonical_element, is_allowed_attribute, is_allowed_element, is_safe_url,
    is_url_attribute,
};

const HTML: &str = "html";
const BODY: &str = "body";
const CLASS: &str = "class";

/// Replacement for URLs that fail the scheme check.
const SAFE_URL: &str = "#";

/// Reader that sanitizes XHTML against the allow lists in `policy`.
#[derive(Debug, Clone)]
pub struct XhtmlReader {
    allowed_classes: Arc<HashSet<String>>,
    base_url: Option<Url>,
    prefix_len: usize,
}

impl XhtmlReader {
    /// Create a reader keeping only `allowed_classes` in `class` attributes and
    /// rebasing URLs onto `base_url` when given.
    #[must_use]
    pub fn new(allowed_classes: Arc<HashSet<String>>, base_url: Option<Url>) -> Self {
        Self {
            allowed_classes,
            base_url,
            prefix_len: 0,
        }
    }

    /// Length of the synthetic prefix framing the input, subtracted from
    /// line 1 columns in error reports.
    #[must_use]
    pub fn with_prefix_len(mut self, prefix_len: usize) -> Self {
        self.prefix_len = prefix_len;
        self
    }

    fn filter_attributes(
        &self,
        reader: &NsReader<&[u8]>,
        element: &str,
        start: &BytesStart<'_>,
    ) -> Result<Vec<Attribute>, ContentError> {
        let mut filtered = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            // namespace declarations never reach the output
            if attr.key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let qname = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if let NameBinding::UnknownPrefix(prefix) =
                NameBinding::from_resolved(&reader.resolve_attribute(attr.key).0)
            {
                return Err(ContentError::Transform(NameBinding::unbound_prefix_message(
                    &prefix, "attribute", &qname,
                )));
            }
            if attr.value.contains(&b'<') {
                return Err(ContentError::Transform(format!(
                    "The value of attribute \"{qname}\" must not contain the '<' character"
                )));
            }

            let name =
                String::from_utf8_lossy(attr.key.local_name().as_ref()).to_ascii_lowercase();
            let value = attr.unescape_value()?;

            if name == CLASS {
                if let Some(classes) = self.filter_classes(&value) {
                    filtered.push(Attribute::new(CLASS, classes));
                }
            } else if is_allowed_attribute(element, &name) {
                let value = if is_url_attribute(element, &name) {
                    self.filter_url(&value)
                } else {
                    value.into_owned()
                };
                filtered.push(Attribute::new(name, value));
            }
        }
        Ok(filtered)
    }

    fn filter_classes(&self, value: &str) -> Option<String> {
        let kept: Vec<&str> = value
            .split_whitespace()
            .filter(|cl| self.allowed_classes.contains(*cl))
            .collect();
        if kept.is_empty() {
            None
        } else {
            Some(kept.join(" "))
        }
    }

    fn filter_url(&self, value: &str) -> String {
        if !is_safe_url(value) {
            return SAFE_URL.to_owned();
        }
        match &self.base_url {
            Some(base) => base
                .join(value)
                .map_or_else(|_| SAFE_URL.to_owned(), String::from),
            None => value.to_owned(),
        }
    }
}

/// Per-parse nesting state.
///
/// `depth` counts open elements including the synthetic wrappers;
/// `filter_depth` is the depth of the disallowed element being skipped.
#[derive(Debug, Default)]
struct Nesting {
    depth: usize,
    filter_depth: Option<usize>,
}

impl Nesting {
    fn start(
        &mut self,
        element: &str,
        foreign: bool,
        attributes: impl FnOnce() -> Result<Vec<Attribute>, ContentError>,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), ContentError> {
        self.depth += 1;

        if self.depth == 1 && element != HTML {
            handler.start_element(HTML, &[])?;
            handler.start_element(BODY, &[])?;
            self.depth += 2;
        }

        if self.filter_depth.is_some() {
            return Ok(());
        }

        if foreign || !is_allowed_element(element) {
            tracing::debug!(element, foreign, "Dropping disallowed element");
            self.filter_depth = Some(self.depth);
            return Ok(());
        }

        let attributes = attributes()?;
        handler.start_element(element, &attributes)
    }

    fn end(&mut self, element: &str, handler: &mut dyn ContentHandler) -> Result<(), ContentError> {
        let depth = self.depth;
        self.depth = self.depth.saturating_sub(1);

        if let Some(filter_depth) = self.filter_depth {
            if filter_depth == depth {
                self.filter_depth = None;
            }
            return Ok(());
        }
        handler.end_element(element)
    }

    fn characters(&self, text: &str, handler: &mut dyn ContentHandler) -> Result<(), ContentError> {
        if self.filter_depth.is_some() || self.depth == 0 {
            return Ok(());
        }
        handler.characters(text)
    }

    fn finish(&self, handler: &mut dyn ContentHandler) -> Result<(), ContentError> {
        // only the synthetic wrappers are left open
        if self.depth == 2 {
            handler.end_element(BODY)?;
            handler.end_element(HTML)?;
        }
        Ok(())
    }
}

impl XhtmlReader {
    /// Forward one parser event. Returns `false` at end of input.
    fn dispatch(
        &self,
        reader: &NsReader<&[u8]>,
        binding: &NameBinding,
        event: Event<'_>,
        nesting: &mut Nesting,
        open: &mut usize,
        handler: &mut dyn ContentHandler,
    ) -> Result<bool, ContentError> {
        match event {
            Event::Start(start) => {
                *open += 1;
                self.start_element(reader, binding, &start, nesting, handler)?;
            }
            Event::Empty(start) => {
                let element = self.start_element(reader, binding, &start, nesting, handler)?;
                nesting.end(&element, handler)?;
            }
            Event::End(end) => {
                *open = open.saturating_sub(1);
                let element =
                    canonical_element(&String::from_utf8_lossy(end.local_name().as_ref()));
                nesting.end(&element, handler)?;
            }
            Event::Text(text) => nesting.characters(&text.unescape()?, handler)?,
            Event::CData(data) => nesting.characters(&String::from_utf8_lossy(&data), handler)?,
            Event::Eof => return Ok(false),
            // comments, processing instructions, declarations and doctypes are dropped
            _ => {}
        }
        Ok(true)
    }

    /// Open an element, returning its canonical name.
    fn start_element(
        &self,
        reader: &NsReader<&[u8]>,
        binding: &NameBinding,
        start: &BytesStart<'_>,
        nesting: &mut Nesting,
        handler: &mut dyn ContentHandler,
    ) -> Result<String, ContentError> {
        if let NameBinding::UnknownPrefix(prefix) = binding {
            let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
            return Err(ContentError::Transform(NameBinding::unbound_prefix_message(
                prefix, "element", &qname,
            )));
        }
        let element = element_name(start);
        let foreign = matches!(binding, NameBinding::Foreign(_));
        nesting.start(
            &element,
            foreign,
            || self.filter_attributes(reader, &element, start),
            handler,
        )?;
        Ok(element)
    }
}

impl XmlReader for XhtmlReader {
    fn parse(
        &mut self,
        input: InputSource<'_>,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), ContentError> {
        let content = input.read_to_string()?;
        let mut reader = NsReader::from_str(&content);
        let mut nesting = Nesting::default();
        let mut open = 0usize;

        handler.start_document()?;
        loop {
            let resolved = reader
                .read_resolved_event()
                .map(|(ns, event)| (NameBinding::from_resolved(&ns), event));
            let (binding, event) = match resolved {
                Ok(resolved) => resolved,
                Err(err) => return Err(self.locate(&content, &reader, &err.to_string())),
            };
            match self.dispatch(&reader, &binding, event, &mut nesting, &mut open, handler) {
                Ok(true) => {}
                Ok(false) => break,
                // markup errors surfaced while handling the event
                Err(ContentError::Transform(msg)) => {
                    return Err(self.locate(&content, &reader, &msg));
                }
                Err(err) => return Err(err),
            }
        }

        if open > 0 {
            return Err(self.locate(
                &content,
                &reader,
                "Unexpected end of document: elements left open",
            ));
        }

        nesting.finish(handler)?;
        handler.end_document()
    }
}

impl XhtmlReader {
    /// Convert a parse failure at the reader's current position into
    /// `InvalidContent`, relative to the user's input.
    fn locate(&self, content: &str, reader: &NsReader<&[u8]>, message: &str) -> ContentError {
        let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
        let (line, column) = LineIndex::new(content).locate(content, offset);
        let mut errors = FirstError::with_prefix_len(self.prefix_len);
        errors.fatal_error(message, line, column);
        errors.into_content_error(message)
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    canonical_element(&String::from_utf8_lossy(start.local_name().as_ref()))
}

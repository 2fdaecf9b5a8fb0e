//! Event sink for content readers.
//!
//! Readers report what they parse as a stream of SAX-style events. Sanitizers
//! sit between a parser and a downstream handler; the tree builder at the end
//! of the chain collects the events into a `Document` for transformation.

use crate::dom::{Document, Element, Node};
use crate::error::ContentError;

/// A single attribute of an element event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Local attribute name.
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

impl Attribute {
    /// Create an attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Receiver of parse events.
pub trait ContentHandler {
    /// Called once before any other event.
    ///
    /// # Errors
    ///
    /// Implementations may abort the parse by returning an error.
    fn start_document(&mut self) -> Result<(), ContentError> {
        Ok(())
    }

    /// Called once after all other events.
    ///
    /// # Errors
    ///
    /// Implementations may abort the parse by returning an error.
    fn end_document(&mut self) -> Result<(), ContentError> {
        Ok(())
    }

    /// An element opens.
    ///
    /// # Errors
    ///
    /// Implementations may abort the parse by returning an error.
    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), ContentError>;

    /// An element closes.
    ///
    /// # Errors
    ///
    /// Implementations may abort the parse by returning an error.
    fn end_element(&mut self, name: &str) -> Result<(), ContentError>;

    /// Character data (already unescaped).
    ///
    /// # Errors
    ///
    /// Implementations may abort the parse by returning an error.
    fn characters(&mut self, text: &str) -> Result<(), ContentError>;
}

/// Builds a `Document` out of handler events.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish building and return the document.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Transform` if no root element was produced or
    /// if elements are still open.
    pub fn finish(self) -> Result<Document, ContentError> {
        if let Some(open) = self.stack.last() {
            return Err(ContentError::Transform(format!(
                "element '{}' was never closed",
                open.name
            )));
        }
        self.root
            .map(Document::new)
            .ok_or_else(|| ContentError::Transform("document has no root element".to_owned()))
    }
}

impl ContentHandler for TreeBuilder {
    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), ContentError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(ContentError::Transform(format!(
                "second root element '{name}'"
            )));
        }
        let mut element = Element::new(name);
        element.attributes = attributes.to_vec();
        self.stack.push(element);
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), ContentError> {
        let Some(element) = self.stack.pop() else {
            return Err(ContentError::Transform(format!(
                "unexpected end of element '{name}'"
            )));
        };
        if element.name != name {
            return Err(ContentError::Transform(format!(
                "end of element '{name}' does not match '{}'",
                element.name
            )));
        }
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ContentError> {
        // text outside the root element carries nothing worth keeping
        if let Some(parent) = self.stack.last_mut() {
            parent.push_text(text);
        }
        Ok(())
    }
}

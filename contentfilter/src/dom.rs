//! In-memory markup tree produced by readers and consumed by stylesheets.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::ContentError;
use crate::handler::Attribute;

/// Elements serialized in the self-closing form (`<br/>`) when empty.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "hr", "img", "input", "link", "meta", "param",
];

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, unescaped.
    Text(String),
}

/// A markup element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local element name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<Attribute>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Value of the named attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Append text, merging with a trailing text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_owned()));
        }
    }

    /// Child elements with the given name.
    pub fn child_elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Concatenated text of this element and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(el, out),
        }
    }
}

/// A parsed document with a single root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Wrap a root element.
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Serialize as XHTML markup without an XML declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_to(&self, out: &mut dyn Write) -> Result<(), ContentError> {
        let mut writer = Writer::new(out);
        write_element(&mut writer, &self.root)
    }

    /// Serialize into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_xhtml(&self) -> Result<String, ContentError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ContentError::Transform(e.to_string()))
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), ContentError> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() && VOID_ELEMENTS.contains(&element.name.as_str()) {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => {
                writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_elements_self_close() {
        let mut div = Element::new("div").with_attribute("class", "text-plain");
        div.push_text("Line 1");
        div.children.push(Node::Element(Element::new("br")));
        div.push_text("Line 2");

        let html = Document::new(div).to_xhtml().unwrap();
        assert_eq!(html, r#"<div class="text-plain">Line 1<br/>Line 2</div>"#);
    }

    #[test]
    fn test_empty_non_void_element_keeps_end_tag() {
        let html = Document::new(Element::new("p")).to_xhtml().unwrap();
        assert_eq!(html, "<p></p>");
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let mut p = Element::new("a").with_attribute("title", "\"x\" & y");
        p.push_text("1 < 2 & it's fine");
        let html = Document::new(p).to_xhtml().unwrap();
        assert_eq!(
            html,
            r#"<a title="&quot;x&quot; &amp; y">1 &lt; 2 &amp; it's fine</a>"#
        );
    }

    #[test]
    fn test_push_text_merges_adjacent() {
        let mut p = Element::new("p");
        p.push_text("a");
        p.push_text("");
        p.push_text("b");
        assert_eq!(p.children, vec![Node::Text("ab".to_owned())]);
        assert_eq!(p.text_content(), "ab");
    }
}

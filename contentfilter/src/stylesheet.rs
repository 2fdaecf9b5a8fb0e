//! Compiled transforms from validated markup to display HTML.
//!
//! A stylesheet is built once per filter and shared across calls; it must be
//! reentrant since concurrent requests transform through the same instance.

use crate::dom::{Document, Element, Node};
use crate::error::ContentError;
use crate::reader::text::{LINE_ELEMENT, TEXT_ELEMENT};

/// Class of the element wrapping rendered plain text.
pub const TEXT_PLAIN_CLASS: &str = "text-plain";

/// Class of the element wrapping rendered XHTML.
pub const TEXT_XHTML_CLASS: &str = "text-xhtml";

const DIV: &str = "div";
const BR: &str = "br";
const BODY: &str = "body";

/// A precompiled transformation of a parsed document.
pub trait Stylesheet: Send + Sync + std::fmt::Debug {
    /// Transform `document` into the final display markup.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Transform` if the document does not have the
    /// shape this stylesheet expects.
    fn transform(&self, document: &Document) -> Result<Document, ContentError>;
}

/// Renders `<text><line>..</line></text>` as a `div` with `<br/>` between lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextToXhtml;

impl Stylesheet for TextToXhtml {
    fn transform(&self, document: &Document) -> Result<Document, ContentError> {
        let root = document.root();
        if root.name != TEXT_ELEMENT {
            return Err(ContentError::Transform(format!(
                "expected '{TEXT_ELEMENT}' root, found '{}'",
                root.name
            )));
        }

        let mut div = Element::new(DIV).with_attribute("class", TEXT_PLAIN_CLASS);
        for (i, line) in root.child_elements(LINE_ELEMENT).enumerate() {
            if i > 0 {
                div.children.push(Node::Element(Element::new(BR)));
            }
            div.push_text(&line.text_content());
        }
        Ok(Document::new(div))
    }
}

/// Unwraps the `body` of a sanitized XHTML document into a `div`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XhtmlToXhtml;

impl Stylesheet for XhtmlToXhtml {
    fn transform(&self, document: &Document) -> Result<Document, ContentError> {
        let root = document.root();
        let mut div = Element::new(DIV).with_attribute("class", TEXT_XHTML_CLASS);
        // a sanitized document without body still renders, just empty
        if let Some(body) = root.child_elements(BODY).next() {
            div.children.clone_from(&body.children);
        }
        Ok(Document::new(div))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_document(lines: &[&str]) -> Document {
        let mut root = Element::new(TEXT_ELEMENT);
        for line in lines {
            let mut el = Element::new(LINE_ELEMENT);
            el.push_text(line);
            root.children.push(Node::Element(el));
        }
        Document::new(root)
    }

    #[test]
    fn test_text_lines_joined_by_breaks() {
        let out = TextToXhtml
            .transform(&text_document(&["Line 1", "Line 2"]))
            .unwrap();
        assert_eq!(
            out.to_xhtml().unwrap(),
            r#"<div class="text-plain">Line 1<br/>Line 2</div>"#
        );
    }

    #[test]
    fn test_blank_lines_keep_breaks() {
        let out = TextToXhtml
            .transform(&text_document(&["a", "", "b"]))
            .unwrap();
        assert_eq!(
            out.to_xhtml().unwrap(),
            r#"<div class="text-plain">a<br/><br/>b</div>"#
        );
    }

    #[test]
    fn test_text_rejects_other_roots() {
        let doc = Document::new(Element::new("html"));
        assert!(TextToXhtml.transform(&doc).is_err());
    }

    #[test]
    fn test_xhtml_unwraps_body() {
        let mut strong = Element::new("strong");
        strong.push_text("Hi");
        let mut body = Element::new(BODY);
        body.children.push(Node::Element(strong));
        let mut html = Element::new("html");
        html.children.push(Node::Element(body));

        let out = XhtmlToXhtml.transform(&Document::new(html)).unwrap();
        assert_eq!(
            out.to_xhtml().unwrap(),
            r#"<div class="text-xhtml"><strong>Hi</strong></div>"#
        );
    }
}

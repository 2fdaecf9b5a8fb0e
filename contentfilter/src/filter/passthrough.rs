//! Opt-in fallback filter for content types without registered rules.

use std::io::Read;
use std::sync::Arc;

use url::Url;

use crate::error::ContentError;
use crate::filter::ContentFilter;
use crate::reader::{TextReader, XmlReader};
use crate::stylesheet::Stylesheet;

/// Accepts any content and renders it without a stylesheet.
///
/// Content is read as plain text, so markup in it is escaped on output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughFilter;

impl ContentFilter for PassThroughFilter {
    fn prefix(&self, _content_type: &str) -> Option<&str> {
        None
    }

    fn suffix(&self, _content_type: &str) -> Option<&str> {
        None
    }

    fn xml_reader(
        &self,
        _base_url: Option<&Url>,
        content_type: &str,
    ) -> Result<Box<dyn XmlReader>, ContentError> {
        tracing::debug!(content_type, "Reading unregistered content type as text");
        Ok(Box::new(TextReader::new()))
    }

    fn xsl_templates(&self, _content_type: &str) -> Option<Arc<dyn Stylesheet>> {
        None
    }

    fn validate(&self, _content_type: &str, _content: &mut dyn Read) -> Result<(), ContentError> {
        Ok(())
    }
}

//! Content filters: per-type validation rules and the dispatcher routing
//! content types to them.
//!
//! - `text`: plain text, always valid
//! - `xhtml`: XHTML fragments, strictly parsed and sanitized
//! - `passthrough`: fallback for unregistered types, no stylesheet
//! - `multi`: immutable content-type registry with a default filter

pub mod multi;
pub mod passthrough;
pub mod text;
pub mod xhtml;

use std::io::Read;
use std::sync::Arc;

use url::Url;

use crate::error::ContentError;
use crate::reader::XmlReader;
use crate::stylesheet::Stylesheet;

pub use multi::{MultiContentFilter, MultiContentFilterBuilder};
pub use passthrough::PassThroughFilter;
pub use text::TextFilter;
pub use xhtml::XhtmlFilter;

/// Validation and rendering rules for one or more content types.
pub trait ContentFilter: Send + Sync {
    /// Markup prepended before parsing so fragments become documents.
    fn prefix(&self, content_type: &str) -> Option<&str>;

    /// Markup appended before parsing, mirroring the prefix.
    fn suffix(&self, content_type: &str) -> Option<&str>;

    /// A reader for the content type, rebasing URLs onto `base_url` if given.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidContentType` if the type is unsupported.
    fn xml_reader(
        &self,
        base_url: Option<&Url>,
        content_type: &str,
    ) -> Result<Box<dyn XmlReader>, ContentError>;

    /// The stylesheet rendering the content type, or `None` to emit the
    /// parsed markup unchanged.
    fn xsl_templates(&self, content_type: &str) -> Option<Arc<dyn Stylesheet>>;

    /// Validate raw content (already framed with prefix and suffix).
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidContent` with the position of the first
    /// problem, `ContentError::InvalidContentType` if the type is
    /// unsupported, or `ContentError::Io` if `content` cannot be read.
    fn validate(&self, content_type: &str, content: &mut dyn Read) -> Result<(), ContentError>;
}

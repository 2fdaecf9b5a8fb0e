//! Rendering entry points.
//!
//! Parse with the filter's reader, apply the filter's stylesheet (if any) and
//! serialize the result as XHTML.

use std::io::Write;

use url::Url;

use crate::content_type::ContentType;
use crate::dom::Document;
use crate::error::ContentError;
use crate::filter::ContentFilter;
use crate::handler::TreeBuilder;
use crate::input::InputSource;

/// Render `input` of `content_type` as an XHTML string.
///
/// `input` must already carry any prefix/suffix the filter expects; use
/// [`format_text`] to have them added.
///
/// # Errors
///
/// Returns `ContentError::InvalidContentType` if no filter handles the type,
/// `ContentError::InvalidContent` if the input does not parse, or
/// `ContentError::Transform` if the stylesheet or serializer fails.
pub fn format(
    content_type: &str,
    base_url: Option<&Url>,
    input: InputSource<'_>,
    filter: &dyn ContentFilter,
) -> Result<String, ContentError> {
    let mut out = Vec::new();
    format_to(content_type, base_url, input, filter, &mut out)?;
    String::from_utf8(out).map_err(|e| ContentError::Transform(e.to_string()))
}

/// Like [`format`], writing the markup to `out`.
///
/// Nothing is written unless parsing and transformation both succeed.
///
/// # Errors
///
/// As [`format`], plus `ContentError::Io` if `out` fails.
pub fn format_to(
    content_type: &str,
    base_url: Option<&Url>,
    input: InputSource<'_>,
    filter: &dyn ContentFilter,
    out: &mut dyn Write,
) -> Result<(), ContentError> {
    let templates = filter.xsl_templates(content_type);
    let mut reader = filter.xml_reader(base_url, content_type)?;

    let mut builder = TreeBuilder::new();
    reader.parse(input, &mut builder)?;
    let parsed = builder.finish()?;

    let rendered: Document = match templates {
        Some(stylesheet) => stylesheet.transform(&parsed)?,
        None => {
            tracing::debug!(content_type, "No stylesheet, emitting parsed markup");
            parsed
        }
    };
    rendered.write_to(out)
}

/// Frame `text` with the prefix and suffix for `content_type`, then render it.
///
/// ```
/// use contentfilter::{ContentType, MultiContentFilter, format_text};
///
/// let filter = MultiContentFilter::default();
/// let html = format_text("Line 1\r\nLine 2", None, ContentType::Text, &filter).unwrap();
/// assert_eq!(html, r#"<div class="text-plain">Line 1<br/>Line 2</div>"#);
/// ```
///
/// # Errors
///
/// See [`format`].
pub fn format_text(
    text: &str,
    base_url: Option<&Url>,
    content_type: ContentType,
    filter: &dyn ContentFilter,
) -> Result<String, ContentError> {
    let mime = content_type.mime_type();
    let input = InputSource::framed(filter.prefix(mime), text, filter.suffix(mime));
    format(mime, base_url, input, filter)
}

/// Like [`format_text`], writing the markup to `out`.
///
/// # Errors
///
/// See [`format_to`].
pub fn format_text_to(
    text: &str,
    base_url: Option<&Url>,
    content_type: ContentType,
    filter: &dyn ContentFilter,
    out: &mut dyn Write,
) -> Result<(), ContentError> {
    let mime = content_type.mime_type();
    let input = InputSource::framed(filter.prefix(mime), text, filter.suffix(mime));
    format_to(mime, base_url, input, filter, out)
}

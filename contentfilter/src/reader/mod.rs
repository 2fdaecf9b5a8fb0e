//! Readers turning raw content into handler events.
//!
//! - `text`: plain text, one `line` element per input line
//! - `xhtml`: XHTML fragments, sanitized against an allow list
//! - `policy`: the allow lists used by the XHTML reader

pub mod policy;
pub mod text;
pub mod xhtml;

use crate::error::ContentError;
use crate::handler::ContentHandler;
use crate::input::InputSource;

pub use text::TextReader;
pub use xhtml::XhtmlReader;

/// A parser for one content type.
///
/// Readers are created per call and are not shared between threads.
pub trait XmlReader {
    /// Parse `input`, reporting events to `handler`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidContent` for malformed input,
    /// `ContentError::Io` if the source cannot be read, or any error the
    /// handler raises.
    fn parse(
        &mut self,
        input: InputSource<'_>,
        handler: &mut dyn ContentHandler,
    ) -> Result<(), ContentError>;
}

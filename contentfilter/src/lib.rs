//! # contentfilter
//!
//! Validation and XHTML rendering of user-submitted content.
//!
//! Content arrives as raw text tagged with a MIME type. A
//! [`MultiContentFilter`] routes it to the filter registered for that type:
//! plain text is always accepted and rendered line by line, XHTML fragments
//! are checked strictly and sanitized against an allow list before rendering.
//!
//! ## Quick Start
//!
//! ```rust
//! use contentfilter::{ContentFilter, ContentType, InputSource, MultiContentFilter, format_text};
//!
//! let filter = MultiContentFilter::default();
//!
//! let mime = ContentType::Xhtml.mime_type();
//! let mut source = InputSource::framed(filter.prefix(mime), "<p>Hi</p>", filter.suffix(mime));
//! filter.validate(mime, source.reader()).unwrap();
//!
//! let html = format_text("<p>Hi <b>there</b></p>", None, ContentType::Xhtml, &filter).unwrap();
//! assert_eq!(html, r#"<div class="text-xhtml"><p>Hi <strong>there</strong></p></div>"#);
//! ```

pub mod config;
mod content_type;
pub mod dom;
mod error;
pub mod error_handler;
pub mod filter;
mod format;
pub mod handler;
mod input;
pub mod output;
mod position;
pub mod reader;
mod report;
mod strategy;
pub mod stylesheet;

pub use config::{ContentFilterConfig, FallbackPolicy, FsSourceConfig};
pub use content_type::{APPLICATION_XHTML, ContentType, TEXT_PLAIN};
pub use error::{ContentError, ScanError, ScanErrorKind, ValidationError, clean_message};
pub use filter::{
    ContentFilter, MultiContentFilter, MultiContentFilterBuilder, PassThroughFilter, TextFilter,
    XhtmlFilter,
};
pub use format::{format, format_text, format_text_to, format_to};
pub use input::InputSource;
pub use report::ValidationReport;

use std::path::Path;

use strategy::fs::{ScanResult, content_type_for, find_files, read_file_bounded};

/// Validate content files on disk.
///
/// Each file is typed by extension, framed with its filter's prefix and
/// suffix and validated through `filter`.
///
/// # Errors
///
/// Returns an error if `fs_config.paths` is empty or if any provided path does not exist.
/// Returns `Ok` with `scanned_files: 0` if paths exist but contain no content files.
/// Unreadable or untyped files are reported in `report.scan_errors`.
pub fn validate_fs(
    fs_config: &FsSourceConfig,
    filter: &MultiContentFilter,
) -> anyhow::Result<ValidationReport> {
    if fs_config.paths.is_empty() {
        anyhow::bail!("No paths provided for validation");
    }

    for path in &fs_config.paths {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
    }

    let (files, mut scan_errors) = find_files(fs_config);

    let mut validation_errors = Vec::new();
    let mut scanned_files: usize = 0;
    let mut failed_files: usize = scan_errors.len();

    for file_path in &files {
        let Some(content_type) = content_type_for(file_path) else {
            scan_errors.push(ScanError {
                file: file_path.clone(),
                kind: ScanErrorKind::UnsupportedContentType,
                message: "No content type for file extension".to_owned(),
            });
            failed_files += 1;
            continue;
        };

        let content = match read_file_bounded(file_path, fs_config.max_file_size) {
            ScanResult::Ok(c) => c,
            ScanResult::Err(e) => {
                scan_errors.push(e);
                failed_files += 1;
                continue;
            }
        };

        match validate_content(file_path, &content, content_type, filter) {
            Ok(None) => scanned_files += 1,
            Ok(Some(error)) => {
                scanned_files += 1;
                validation_errors.push(error);
            }
            Err(scan_err) => {
                scan_errors.push(scan_err);
                failed_files += 1;
            }
        }
    }

    tracing::debug!(
        scanned_files,
        failed_files,
        errors = validation_errors.len(),
        "Validation finished"
    );

    let ok = validation_errors.is_empty() && scan_errors.is_empty();
    Ok(ValidationReport {
        scanned_files,
        failed_files,
        ok,
        validation_errors,
        scan_errors,
    })
}

/// Validate one file's content; content problems are a `ValidationError`,
/// anything else is a `ScanError`.
fn validate_content(
    file: &Path,
    content: &str,
    content_type: ContentType,
    filter: &MultiContentFilter,
) -> Result<Option<ValidationError>, ScanError> {
    let mime = content_type.mime_type();
    let mut source = InputSource::framed(filter.prefix(mime), content, filter.suffix(mime));

    match filter.validate(mime, source.reader()) {
        Ok(()) => Ok(None),
        Err(ContentError::InvalidContent {
            message,
            line,
            column,
        }) => Ok(Some(ValidationError {
            file: file.to_path_buf(),
            content_type: mime.to_owned(),
            line,
            column,
            error: message,
        })),
        Err(ContentError::InvalidContentType(message)) => Err(ScanError {
            file: file.to_path_buf(),
            kind: ScanErrorKind::UnsupportedContentType,
            message,
        }),
        Err(err) => Err(ScanError {
            file: file.to_path_buf(),
            kind: ScanErrorKind::IoError,
            message: err.to_string(),
        }),
    }
}

//! Batch validation report.

use serde::Serialize;

use crate::error::{ScanError, ValidationError};

/// Result of a batch validation run.
///
/// Callers must check both `validation_errors` and `scan_errors`: a non-empty
/// `scan_errors` means some files were never validated.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ValidationReport {
    /// Number of files read and validated.
    pub scanned_files: usize,
    /// Number of files that could not be validated.
    pub failed_files: usize,
    /// Whether every scanned file passed and no scan errors occurred.
    pub ok: bool,
    /// Content rejected by its filter, one entry per rejected file.
    pub validation_errors: Vec<ValidationError>,
    /// Files that could not be read or typed.
    pub scan_errors: Vec<ScanError>,
}

impl ValidationReport {
    /// Total number of files attempted (scanned + failed).
    #[must_use]
    pub fn files_attempted(&self) -> usize {
        self.scanned_files + self.failed_files
    }

    /// Number of validation errors found.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.validation_errors.len()
    }
}

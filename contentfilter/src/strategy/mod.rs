//! Content sources for batch validation.
//!
//! Only the filesystem source exists today; `validate_fs()` uses it directly.

pub mod fs;

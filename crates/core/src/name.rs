//! Entry-name validation
//!
//! Directory-entry names are Unicode strings with filesystem constraints:
//! - non-empty
//! - no NUL byte (0x00): NUL is appended to range-scan cursors to resume
//!   strictly after an entry, so it can never occur inside a name
//! - no slash (0x2F): names are single path components
//! - at most [`MAX_NAME_BYTES`] bytes
//!
//! UTF-8 validity is guaranteed by `&str` itself, and UTF-8 never produces
//! the byte 0xFF, which is what makes `parent ∥ 0xFF` a sound upper bound
//! for directory range scans.

use thiserror::Error;

/// Maximum entry-name length in bytes
pub const MAX_NAME_BYTES: usize = 255;

/// Validate a directory-entry name
///
/// # Examples
///
/// ```
/// use rocketfs_core::name::validate_name;
///
/// assert!(validate_name("docs").is_ok());
/// assert!(validate_name("日本語").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("a/b").is_err());
/// assert!(validate_name("a\0b").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.contains('\0') {
        return Err(NameError::ContainsNul);
    }
    if name.contains('/') {
        return Err(NameError::ContainsSlash);
    }
    let len = name.len();
    if len > MAX_NAME_BYTES {
        return Err(NameError::TooLong {
            actual: len,
            max: MAX_NAME_BYTES,
        });
    }
    Ok(())
}

/// Entry-name validation errors
///
/// These all surface as the invalid-argument wire code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty
    #[error("entry name cannot be empty")]
    Empty,

    /// Name contains a NUL byte
    #[error("entry name cannot contain NUL bytes")]
    ContainsNul,

    /// Name contains a slash
    #[error("entry name cannot contain '/'")]
    ContainsSlash,

    /// Name exceeds the length bound
    #[error("entry name too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}

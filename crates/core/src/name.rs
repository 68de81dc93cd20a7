//! Name validation for domainmap
//!
//! Attribute names and domain names end up inside quoted identifiers of the
//! store's query language, so the rules below are enforced once when
//! metadata is built and again when a select names a domain explicitly.
//!
//! ## Rules
//!
//! - Names must be valid UTF-8 (guaranteed by Rust's &str type)
//! - Names must not be empty
//! - Names must not contain NUL bytes (\0)
//! - Names must not exceed `max_name_bytes` (default: 1024)
//! - Names must not collide with the item-name pseudo attribute `itemName()`

use crate::limits::Limits;
use thiserror::Error;

/// Pseudo attribute naming the item identifier in query text
pub const ITEM_NAME: &str = "itemName()";

/// Validate a name using default limits
///
/// # Examples
///
/// ```
/// use domainmap_core::name::validate_name;
///
/// // Valid names
/// assert!(validate_name("age").is_ok());
/// assert!(validate_name("address.city").is_ok());
///
/// // Invalid names
/// assert!(validate_name("").is_err()); // empty
/// assert!(validate_name("a\x00b").is_err()); // contains NUL
/// assert!(validate_name("itemName()").is_err()); // reserved
/// ```
pub fn validate_name(name: &str) -> Result<(), NameError> {
    validate_name_with_limits(name, &Limits::default())
}

/// Validate a name with custom limits
pub fn validate_name_with_limits(name: &str, limits: &Limits) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    if name.contains('\x00') {
        return Err(NameError::ContainsNul);
    }

    if name == ITEM_NAME {
        return Err(NameError::Reserved(name.to_string()));
    }

    let len = name.len();
    if len > limits.max_name_bytes {
        return Err(NameError::TooLong {
            actual: len,
            max: limits.max_name_bytes,
        });
    }

    Ok(())
}

/// Name validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty (length 0)
    #[error("Name cannot be empty")]
    Empty,

    /// Name contains NUL byte (\0)
    #[error("Name cannot contain NUL bytes")]
    ContainsNul,

    /// Name collides with a query-language pseudo attribute
    #[error("Name '{0}' is reserved")]
    Reserved(String),

    /// Name exceeds maximum length
    #[error("Name too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual name length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },
}

impl NameError {
    /// Get the reason code for this error
    pub fn reason_code(&self) -> &'static str {
        match self {
            NameError::Empty => "empty_name",
            NameError::ContainsNul => "contains_nul",
            NameError::Reserved(_) => "reserved_name",
            NameError::TooLong { .. } => "name_too_long",
        }
    }
}

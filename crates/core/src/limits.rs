//! Size limits imposed by the attribute store
//!
//! The store caps attribute names, attribute values, the number of values a
//! single item may carry and the `limit` clause of a select. Encoded values
//! are validated *after* encoding, since padding and base64 both grow the
//! stored string.
//!
//! ## Contract
//!
//! The defaults mirror the store's documented quotas. Custom limits can be
//! set through the `[limits]` table of `domainmap.toml`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size limits for names, values, items and queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum attribute or domain name length in bytes (default: 1024)
    pub max_name_bytes: usize,

    /// Maximum encoded attribute value length in bytes (default: 1024)
    pub max_value_bytes: usize,

    /// Maximum stored values per item (default: 256)
    pub max_attributes_per_item: usize,

    /// Largest accepted `limit` clause (default: 2500)
    pub max_select_limit: u32,

    /// Maximum operands in an `in (...)` list (default: 20)
    pub max_in_values: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_name_bytes: 1024,
            max_value_bytes: 1024,
            max_attributes_per_item: 256,
            max_select_limit: 2500,
            max_in_values: 20,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    ///
    /// This is useful for unit tests that need to test limit enforcement
    /// without creating extremely large values.
    pub fn with_small_limits() -> Self {
        Limits {
            max_name_bytes: 16,
            max_value_bytes: 32,
            max_attributes_per_item: 4,
            max_select_limit: 10,
            max_in_values: 3,
        }
    }

    /// Validate a name length
    ///
    /// Note: This only validates length. For full name validation including
    /// empty names and NUL bytes, use `validate_name()` from the `name` module.
    pub fn validate_name_length(&self, name: &str) -> Result<(), LimitError> {
        let len = name.len();
        if len > self.max_name_bytes {
            return Err(LimitError::NameTooLong {
                actual: len,
                max: self.max_name_bytes,
            });
        }
        Ok(())
    }

    /// Validate an encoded attribute value
    pub fn validate_encoded_value(&self, attribute: &str, encoded: &str) -> Result<(), LimitError> {
        let len = encoded.len();
        if len > self.max_value_bytes {
            return Err(LimitError::ValueTooLong {
                attribute: attribute.to_string(),
                actual: len,
                max: self.max_value_bytes,
            });
        }
        Ok(())
    }

    /// Validate the number of stored values on one item
    pub fn validate_item_size(&self, count: usize) -> Result<(), LimitError> {
        if count > self.max_attributes_per_item {
            return Err(LimitError::TooManyAttributes {
                actual: count,
                max: self.max_attributes_per_item,
            });
        }
        Ok(())
    }

    /// Validate a `limit` clause
    pub fn validate_select_limit(&self, limit: u32) -> Result<(), LimitError> {
        if limit == 0 || limit > self.max_select_limit {
            return Err(LimitError::SelectLimitOutOfRange {
                actual: limit,
                max: self.max_select_limit,
            });
        }
        Ok(())
    }

    /// Validate the operand count of an `in (...)` list
    pub fn validate_in_values(&self, count: usize) -> Result<(), LimitError> {
        if count == 0 || count > self.max_in_values {
            return Err(LimitError::InListOutOfRange {
                actual: count,
                max: self.max_in_values,
            });
        }
        Ok(())
    }
}

/// Limit validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LimitError {
    /// Name exceeds maximum length
    #[error("Name too long: {actual} bytes exceeds maximum {max}")]
    NameTooLong {
        /// Actual name length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Encoded value exceeds maximum length
    #[error("Value of '{attribute}' too long: {actual} bytes exceeds maximum {max}")]
    ValueTooLong {
        /// Attribute the value belongs to
        attribute: String,
        /// Actual encoded length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Item carries too many stored values
    #[error("Too many attribute values: {actual} exceeds maximum {max}")]
    TooManyAttributes {
        /// Actual value count
        actual: usize,
        /// Maximum allowed count
        max: usize,
    },

    /// Limit clause is zero or above the store maximum
    #[error("Select limit {actual} out of range 1..={max}")]
    SelectLimitOutOfRange {
        /// Requested limit
        actual: u32,
        /// Maximum allowed limit
        max: u32,
    },

    /// `in` list is empty or too long
    #[error("In-list with {actual} values out of range 1..={max}")]
    InListOutOfRange {
        /// Operand count
        actual: usize,
        /// Maximum allowed count
        max: usize,
    },
}

impl LimitError {
    /// Get the reason code for this violation
    pub fn reason_code(&self) -> &'static str {
        match self {
            LimitError::NameTooLong { .. } => "name_too_long",
            LimitError::ValueTooLong { .. } => "value_too_long",
            LimitError::TooManyAttributes { .. } => "too_many_attributes",
            LimitError::SelectLimitOutOfRange { .. } => "select_limit_out_of_range",
            LimitError::InListOutOfRange { .. } => "in_list_out_of_range",
        }
    }
}

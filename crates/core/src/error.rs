//! Error types for domainmap
//!
//! This module defines the error taxonomy shared by every crate in the
//! workspace. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! ## Taxonomy
//!
//! - [`ConfigurationError`]: static schema defects, surfaced once when domain
//!   metadata is built. Never retried.
//! - [`RestoreError`]: a stored string cannot be decoded to its declared type.
//!   The caller of the read decides whether to skip, default or abort.
//! - [`EncodeError`]: a typed value does not fit the codec it is routed to.
//! - [`Error::IncompleteMatcher`]: a `between` matcher rendered without its
//!   upper bound. A programming error in query construction.
//!
//! Unresolved query attributes are deliberately *not* errors; see
//! `RenderedQuery::unresolved` in the query crate.

use crate::limits::LimitError;
use crate::name::NameError;
use crate::path::PathError;
use crate::value::ValueType;
use std::io;
use thiserror::Error;

/// Result type alias for domainmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for domainmap
#[derive(Debug, Error)]
pub enum Error {
    /// Static schema defect detected while building metadata
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Stored value could not be decoded
    #[error(transparent)]
    Restore(#[from] RestoreError),

    /// Typed value could not be encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// `between` matcher rendered before its second bound was supplied
    #[error("Incomplete matcher on '{attribute}': {operator} requires a second bound")]
    IncompleteMatcher {
        /// Attribute the matcher was attached to
        attribute: String,
        /// Operator keyword (`between`)
        operator: &'static str,
    },

    /// Attribute referenced by a strict query is not mapped
    #[error("Attribute '{attribute}' is not defined for type '{type_name}'")]
    UnresolvedAttribute {
        /// Attribute name used in the query
        attribute: String,
        /// Structural type whose metadata was consulted
        type_name: String,
    },

    /// Select rendered without a domain and without metadata to supply one
    #[error("Select has no domain")]
    MissingDomain,

    /// Size limit violated
    #[error(transparent)]
    Limit(#[from] LimitError),

    /// Invalid attribute or domain name
    #[error(transparent)]
    Name(#[from] NameError),

    /// Property path could not be read or written
    #[error(transparent)]
    Path(#[from] PathError),

    /// I/O error (configuration and schema files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration file could not be parsed or serialized
    #[error("Config error: {0}")]
    Config(String),

    /// Record (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Stable reason code for logs and callers that branch on error kind
    pub fn reason_code(&self) -> &'static str {
        match self {
            Error::Configuration(e) => e.reason_code(),
            Error::Restore(_) => "restore_failed",
            Error::Encode(_) => "encode_failed",
            Error::IncompleteMatcher { .. } => "incomplete_matcher",
            Error::UnresolvedAttribute { .. } => "unresolved_attribute",
            Error::MissingDomain => "missing_domain",
            Error::Limit(e) => e.reason_code(),
            Error::Name(e) => e.reason_code(),
            Error::Path(_) => "path_error",
            Error::Io(_) => "io_error",
            Error::Config(_) => "config_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error represents a static configuration defect
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Static schema defects
///
/// All variants are fatal and surface at metadata build time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A collection or array property has no element metadata
    #[error("Property '{property}' of '{type_name}' is a {shape} but declares no container metadata")]
    MissingContainerMetadata {
        /// Declaring structural type
        type_name: String,
        /// Property name
        property: String,
        /// Declared shape (`collection` or `array`)
        shape: &'static str,
    },

    /// Two merged types declare the same attribute name
    #[error("Duplicate attribute '{attribute}': declared by both '{existing_type}' and '{incoming_type}'")]
    DuplicateAttribute {
        /// Attribute name in conflict
        attribute: String,
        /// Type that declared the attribute first
        existing_type: String,
        /// Type whose merge introduced the collision
        incoming_type: String,
    },

    /// Identifier property is not string-typed
    #[error("Identifier '{property}' of '{type_name}' must be a String, found {found}")]
    IdentifierNotString {
        /// Declaring structural type
        type_name: String,
        /// Identifier property name
        property: String,
        /// Declared value type
        found: ValueType,
    },

    /// More than one property is marked as identifier
    #[error("Type '{type_name}' declares more than one identifier ('{first}' and '{second}')")]
    DuplicateIdentifier {
        /// Declaring structural type
        type_name: String,
        /// First identifier property
        first: String,
        /// Second identifier property
        second: String,
    },

    /// Custom codec id not present in the registry
    #[error("Unknown codec '{codec}' for property '{property}' of '{type_name}'")]
    UnknownCodec {
        /// Declaring structural type
        type_name: String,
        /// Property name
        property: String,
        /// Requested codec id
        codec: String,
    },

    /// Structural type not present in the schema catalog
    #[error("Unknown structural type '{0}'")]
    UnknownType(String),

    /// Flattening recursed back into a type already being flattened
    #[error("Flatten cycle detected: {path}")]
    FlattenCycle {
        /// Chain of types forming the cycle (`A -> B -> A`)
        path: String,
    },

    /// Encoding directive does not apply to the property's value type
    #[error("Encoding {encoding} cannot be applied to property '{property}' of '{type_name}' ({value_type})")]
    IncompatibleEncoding {
        /// Declaring structural type
        type_name: String,
        /// Property name
        property: String,
        /// Directive name
        encoding: &'static str,
        /// Declared value type
        value_type: ValueType,
    },

    /// Attribute or domain name violates the store's naming rules
    #[error("Invalid name '{name}' in '{type_name}': {reason}")]
    InvalidName {
        /// Declaring structural type
        type_name: String,
        /// Offending name
        name: String,
        /// Rule violated
        reason: NameError,
    },

    /// Schema description could not be introspected
    #[error("Cannot introspect '{type_name}': {reason}")]
    Introspection {
        /// Structural type
        type_name: String,
        /// Underlying cause
        reason: String,
    },
}

impl ConfigurationError {
    /// Reason code for this configuration error
    pub fn reason_code(&self) -> &'static str {
        match self {
            ConfigurationError::MissingContainerMetadata { .. } => "missing_container_metadata",
            ConfigurationError::DuplicateAttribute { .. } => "duplicate_attribute",
            ConfigurationError::IdentifierNotString { .. } => "identifier_not_string",
            ConfigurationError::DuplicateIdentifier { .. } => "duplicate_identifier",
            ConfigurationError::UnknownCodec { .. } => "unknown_codec",
            ConfigurationError::UnknownType(_) => "unknown_type",
            ConfigurationError::FlattenCycle { .. } => "flatten_cycle",
            ConfigurationError::IncompatibleEncoding { .. } => "incompatible_encoding",
            ConfigurationError::InvalidName { .. } => "invalid_name",
            ConfigurationError::Introspection { .. } => "introspection_failed",
        }
    }
}

/// A stored string could not be decoded to the declared type
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot restore '{value}' as {target}: {reason}")]
pub struct RestoreError {
    /// The offending stored string
    pub value: String,
    /// Declared target type
    pub target: ValueType,
    /// Why decoding failed
    pub reason: String,
}

impl RestoreError {
    /// Create a restore error
    pub fn new(value: impl Into<String>, target: ValueType, reason: impl Into<String>) -> Self {
        RestoreError {
            value: value.into(),
            target,
            reason: reason.into(),
        }
    }
}

/// A typed value could not be encoded by a codec
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Value variant does not match the codec's value type
    #[error("Codec '{codec}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Codec id
        codec: String,
        /// Value type the codec handles
        expected: ValueType,
        /// Type name of the supplied value
        found: &'static str,
    },

    /// Value lies outside the representable range of the codec
    #[error("Value {value} does not fit codec '{codec}': {reason}")]
    OutOfRange {
        /// Codec id
        codec: String,
        /// Natural string form of the value
        value: String,
        /// Range violated
        reason: String,
    },

    /// Symbol is not one of the enum's declared variants
    #[error("'{symbol}' is not a variant of {type_name}")]
    UnknownVariant {
        /// Enum type name
        type_name: String,
        /// Supplied symbol
        symbol: String,
    },

    /// Object has no usable identifier to become the item name
    #[error("Object of '{type_name}' has no identifier value")]
    MissingIdentifier {
        /// Structural type of the object
        type_name: String,
    },

    /// Record field could not be converted to a typed value
    #[error("Cannot convert {found} to {expected}")]
    Unconvertible {
        /// Declared value type
        expected: ValueType,
        /// JSON type found in the record
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_duplicate_attribute_names_both_types() {
        let err = Error::from(ConfigurationError::DuplicateAttribute {
            attribute: "name".to_string(),
            existing_type: "Person".to_string(),
            incoming_type: "Address".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("Person"));
        assert!(msg.contains("Address"));
        assert!(err.is_configuration());
        assert_eq!(err.reason_code(), "duplicate_attribute");
    }

    #[test]
    fn test_error_display_restore() {
        let err = RestoreError::new("abc", ValueType::Int, "not a number");
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("Int"));
        assert!(msg.contains("not a number"));
    }

    #[test]
    fn test_error_display_incomplete_matcher() {
        let err = Error::IncompleteMatcher {
            attribute: "age".to_string(),
            operator: "between",
        };
        assert!(err.to_string().contains("age"));
        assert_eq!(err.reason_code(), "incomplete_matcher");
    }

    #[test]
    fn test_error_from_restore() {
        let err: Error = RestoreError::new("x", ValueType::Bool, "bad").into();
        assert!(matches!(err, Error::Restore(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_configuration_reason_codes_are_distinct() {
        let codes = [
            ConfigurationError::UnknownType("X".into()).reason_code(),
            ConfigurationError::FlattenCycle { path: "A -> A".into() }.reason_code(),
            ConfigurationError::MissingContainerMetadata {
                type_name: "A".into(),
                property: "tags".into(),
                shape: "collection",
            }
            .reason_code(),
        ];
        assert_eq!(codes.len(), 3);
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
    }
}

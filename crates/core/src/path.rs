//! Dotted property paths into object records
//!
//! Mapped objects travel through the mapper as JSON records
//! (`serde_json::Value`), so any `Serialize`/`Deserialize` type can be mapped
//! without reflection. A [`PropertyPath`] addresses one property of a record,
//! possibly through flattened sub-objects: `address.city`.
//!
//! # Path Syntax
//!
//! | Syntax | Meaning | Example |
//! |--------|---------|---------|
//! | `key` | Top-level property | `name` |
//! | `key1.key2` | Nested property | `address.city` |
//! | (empty) | Root | `` |
//!
//! Writes can create missing intermediate objects. Creation is opt-in: the
//! caller passes a vivify callback that decides what a blank intermediate
//! looks like, or refuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::value::json_type_name;

/// Error type for property path parsing and traversal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Empty key in path
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),

    /// Type mismatch during path traversal
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Path prefix where traversal stopped
        path: String,
        /// Expected type
        expected: &'static str,
        /// Actual type found
        found: &'static str,
    },

    /// Intermediate object is null and auto-vivification is off
    #[error("cannot write through null intermediate '{path}'")]
    NullIntermediate {
        /// Path prefix of the missing intermediate
        path: String,
    },
}

/// A dotted path naming one property of a record
///
/// # Examples
///
/// ```
/// use domainmap_core::path::PropertyPath;
///
/// let city = PropertyPath::root().key("address").key("city");
/// let parsed: PropertyPath = "address.city".parse().unwrap();
/// assert_eq!(parsed, city);
/// assert_eq!(city.to_string(), "address.city");
/// assert_eq!(city.parent(), Some(PropertyPath::root().key("address")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Create the root path (empty path)
    pub fn root() -> Self {
        PropertyPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<String>) -> Self {
        PropertyPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key, consuming self
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(key.into());
        self
    }

    /// Child path `self.key` without consuming self
    pub fn child(&self, key: &str) -> Self {
        self.clone().key(key)
    }

    /// Parent path, or `None` for the root
    pub fn parent(&self) -> Option<PropertyPath> {
        if self.segments.is_empty() {
            None
        } else {
            let mut segments = self.segments.clone();
            segments.pop();
            Some(PropertyPath { segments })
        }
    }

    /// Last segment, or `None` for the root
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Whether `self` is a (non-strict) prefix of `other`
    pub fn is_ancestor_of(&self, other: &PropertyPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(PropertyPath::root());
        }

        let mut segments = Vec::new();
        let mut position = 0;
        for part in s.split('.') {
            if part.is_empty() {
                return Err(PathError::EmptyKey(position));
            }
            position += part.len() + 1;
            segments.push(part.to_string());
        }
        Ok(PropertyPath { segments })
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

// =============================================================================
// Path Operations
// =============================================================================

/// Get the value at path within a record
///
/// Returns `None` if any segment is missing or an intermediate is not an
/// object. A null intermediate reads as absent.
///
/// # Examples
///
/// ```
/// use domainmap_core::path::{get_at_path, PropertyPath};
///
/// let record = serde_json::json!({"address": {"city": "Oslo"}});
/// let city = get_at_path(&record, &"address.city".parse().unwrap());
/// assert_eq!(city.and_then(|v| v.as_str()), Some("Oslo"));
///
/// let none = serde_json::json!({"address": null});
/// assert!(get_at_path(&none, &"address.city".parse().unwrap()).is_none());
/// ```
pub fn get_at_path<'a>(
    record: &'a serde_json::Value,
    path: &PropertyPath,
) -> Option<&'a serde_json::Value> {
    let mut current = record;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set the value at path within a record
///
/// Missing or null intermediates are handed to `vivify` together with their
/// path; it returns the blank object to insert, or `None` to refuse the
/// write. A null root is replaced by an empty object.
///
/// # Errors
///
/// * [`PathError::NullIntermediate`] - `vivify` refused to create an intermediate
/// * [`PathError::TypeMismatch`] - an intermediate exists but is not an object
pub fn set_at_path<F>(
    record: &mut serde_json::Value,
    path: &PropertyPath,
    value: serde_json::Value,
    mut vivify: F,
) -> Result<(), PathError>
where
    F: FnMut(&PropertyPath) -> Option<serde_json::Value>,
{
    let segments = path.segments();
    if segments.is_empty() {
        *record = value;
        return Ok(());
    }

    if record.is_null() {
        *record = serde_json::Value::Object(serde_json::Map::new());
    }

    let (parents, last) = segments.split_at(segments.len() - 1);
    let mut current = record;
    let mut walked = PropertyPath::root();

    for segment in parents {
        walked.segments.push(segment.clone());
        let obj = match current {
            serde_json::Value::Object(obj) => obj,
            other => {
                return Err(PathError::TypeMismatch {
                    path: walked.parent().unwrap_or_default().to_string(),
                    expected: "object",
                    found: json_type_name(other),
                })
            }
        };
        let needs_instance = obj.get(segment).map_or(true, |v| v.is_null());
        if needs_instance {
            let blank = vivify(&walked).ok_or_else(|| PathError::NullIntermediate {
                path: walked.to_string(),
            })?;
            obj.insert(segment.clone(), blank);
        }
        current = match obj.get_mut(segment) {
            Some(next) => next,
            None => {
                return Err(PathError::NullIntermediate {
                    path: walked.to_string(),
                })
            }
        };
    }

    match current {
        serde_json::Value::Object(obj) => {
            obj.insert(last[0].clone(), value);
            Ok(())
        }
        other => Err(PathError::TypeMismatch {
            path: walked.to_string(),
            expected: "object",
            found: json_type_name(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blank(_: &PropertyPath) -> Option<serde_json::Value> {
        Some(json!({}))
    }

    fn refuse(_: &PropertyPath) -> Option<serde_json::Value> {
        None
    }

    #[test]
    fn test_parse_and_display() {
        let path: PropertyPath = "a.b.c".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.to_string(), "a.b.c");
        assert_eq!(path.last_segment(), Some("c"));
    }

    #[test]
    fn test_parse_empty_is_root() {
        let path: PropertyPath = "".parse().unwrap();
        assert!(path.is_root());
        assert_eq!(path.parent(), None);
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert_eq!("a..b".parse::<PropertyPath>(), Err(PathError::EmptyKey(2)));
        assert!(".a".parse::<PropertyPath>().is_err());
    }

    #[test]
    fn test_ancestry() {
        let a: PropertyPath = "a".parse().unwrap();
        let ab: PropertyPath = "a.b".parse().unwrap();
        assert!(a.is_ancestor_of(&ab));
        assert!(!ab.is_ancestor_of(&a));
        assert!(PropertyPath::root().is_ancestor_of(&a));
    }

    #[test]
    fn test_get_missing_is_none() {
        let record = json!({"a": 1});
        assert!(get_at_path(&record, &"b".parse().unwrap()).is_none());
        assert!(get_at_path(&record, &"a.b".parse().unwrap()).is_none());
    }

    #[test]
    fn test_set_creates_intermediates_when_vivifying() {
        let mut record = json!({});
        set_at_path(&mut record, &"address.geo.lat".parse().unwrap(), json!(1.5), blank)
            .unwrap();
        assert_eq!(record, json!({"address": {"geo": {"lat": 1.5}}}));
    }

    #[test]
    fn test_set_replaces_null_intermediate() {
        let mut record = json!({"address": null});
        set_at_path(&mut record, &"address.city".parse().unwrap(), json!("Oslo"), blank)
            .unwrap();
        assert_eq!(record, json!({"address": {"city": "Oslo"}}));
    }

    #[test]
    fn test_set_refused_vivify_reports_path() {
        let mut record = json!({});
        let err = set_at_path(&mut record, &"address.city".parse().unwrap(), json!("x"), refuse)
            .unwrap_err();
        assert_eq!(
            err,
            PathError::NullIntermediate {
                path: "address".to_string()
            }
        );
    }

    #[test]
    fn test_set_through_scalar_is_type_mismatch() {
        let mut record = json!({"address": "flat"});
        let err = set_at_path(&mut record, &"address.city".parse().unwrap(), json!("x"), blank)
            .unwrap_err();
        assert!(matches!(err, PathError::TypeMismatch { found: "string", .. }));
    }

    #[test]
    fn test_set_existing_intermediate_not_vivified() {
        let mut record = json!({"address": {"zip": "0150"}});
        let mut calls = 0;
        set_at_path(&mut record, &"address.city".parse().unwrap(), json!("Oslo"), |_| {
            calls += 1;
            Some(json!({}))
        })
        .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(record, json!({"address": {"zip": "0150", "city": "Oslo"}}));
    }

    #[test]
    fn test_set_null_root_becomes_object() {
        let mut record = serde_json::Value::Null;
        set_at_path(&mut record, &"name".parse().unwrap(), json!("a"), refuse).unwrap();
        assert_eq!(record, json!({"name": "a"}));
    }
}

//! Value types for domainmap
//!
//! This module defines:
//! - [`Value`]: typed values crossing the codec seam
//! - [`ValueType`]: declared scalar type of an attribute
//! - [`ContainerType`]: how many stored values one property projects to
//! - [`DeferredReference`]: an unresolved pointer to an item in another domain
//!
//! ## Type Rules
//!
//! - The store only holds strings. Every `Value` has a *natural string form*
//!   (its `Display`), which is what the untyped default codec writes.
//! - `Int(1) != Long(1)`: equality never coerces between variants.
//! - Codecs are the only place where numeric widening happens.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EncodeError;

/// Declared scalar type of an attribute
///
/// Enum and reference types carry the name of the type they refer to so two
/// attributes with different enums never share an attribute key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// UTF-8 string
    String,
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 64-bit float
    Float,
    /// UTC timestamp
    Timestamp,
    /// Raw bytes
    Bytes,
    /// Enumeration, by type name
    Enum(String),
    /// Reference to an item of another mapped type, by type name
    Reference(String),
}

impl ValueType {
    /// Whether the lexicographic range encoding applies to this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Long | ValueType::Float)
    }

    /// Whether this is an integral numeric type
    pub fn is_integral(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Long)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "String"),
            ValueType::Bool => write!(f, "Bool"),
            ValueType::Int => write!(f, "Int"),
            ValueType::Long => write!(f, "Long"),
            ValueType::Float => write!(f, "Float"),
            ValueType::Timestamp => write!(f, "Timestamp"),
            ValueType::Bytes => write!(f, "Bytes"),
            ValueType::Enum(name) => write!(f, "Enum({})", name),
            ValueType::Reference(name) => write!(f, "Reference({})", name),
        }
    }
}

/// How a property projects onto stored attribute values
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    /// Exactly one stored value
    #[default]
    Scalar,
    /// Ordered sequence, one stored value per element
    List,
    /// Unordered set, one stored value per distinct element
    Set,
    /// Fixed array, one stored value per element
    Array,
}

impl ContainerType {
    /// Whether the property is multi-valued
    pub fn is_multi(&self) -> bool {
        !matches!(self, ContainerType::Scalar)
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerType::Scalar => "scalar",
            ContainerType::List => "list",
            ContainerType::Set => "set",
            ContainerType::Array => "array",
        };
        write!(f, "{}", name)
    }
}

/// Unresolved reference to an item of another domain
///
/// Decoding a reference attribute never touches the store. The reference
/// only records where the item lives; the query crate turns it into a
/// `select` when the caller dereferences it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeferredReference {
    /// Domain holding the referenced item
    pub domain: String,
    /// Mapped structural type of the referenced item
    pub type_name: String,
    /// Identifier (item name) of the referenced item
    pub id: String,
}

impl DeferredReference {
    /// Create a deferred reference
    pub fn new(
        domain: impl Into<String>,
        type_name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        DeferredReference {
            domain: domain.into(),
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

/// Typed value handed to and produced by codecs
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 string
    String(String),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Enum constant, by symbolic name
    Symbol(String),
    /// Reference to an item in another domain
    Reference(DeferredReference),
}

impl Value {
    /// Variant name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Timestamp(_) => "Timestamp",
            Value::Bytes(_) => "Bytes",
            Value::Symbol(_) => "Symbol",
            Value::Reference(_) => "Reference",
        }
    }

    /// `true` for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrowed text of a [`Value::String`]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widen integral values (and numeric strings) to i128
    ///
    /// Used by the numeric codecs so one codec serves both `Int` and `Long`
    /// attributes and query operands written with either literal width.
    pub fn as_integral(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i as i128),
            Value::Long(l) => Some(*l as i128),
            Value::String(s) => s.trim().parse::<i128>().ok(),
            _ => None,
        }
    }

    /// Widen numeric values (and numeric strings) to f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Long(l) => Some(*l as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Convert to a record (JSON) value
    ///
    /// Bytes become an array of numbers and references become an object, so
    /// that `serde` can deserialize them into `Vec<u8>` and
    /// [`DeferredReference`] fields respectively.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Long(l) => serde_json::Value::from(*l),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) | Value::Symbol(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Bytes(b) => {
                serde_json::Value::Array(b.iter().map(|x| serde_json::Value::from(*x)).collect())
            }
            Value::Reference(r) => serde_json::to_value(r).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Convert a record (JSON) value into a typed value of the declared type
    ///
    /// `id_property` names the identifier field used when a reference is
    /// embedded as a full object rather than as an id or a
    /// [`DeferredReference`].
    pub fn from_json(
        json: &serde_json::Value,
        value_type: &ValueType,
        id_property: Option<&str>,
    ) -> Result<Value, EncodeError> {
        use serde_json::Value as Json;

        let unconvertible = || EncodeError::Unconvertible {
            expected: value_type.clone(),
            found: json_type_name(json),
        };

        if json.is_null() {
            return Ok(Value::Null);
        }

        match value_type {
            ValueType::String => match json {
                Json::String(s) => Ok(Value::String(s.clone())),
                Json::Number(n) => Ok(Value::String(n.to_string())),
                Json::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(unconvertible()),
            },
            ValueType::Bool => json.as_bool().map(Value::Bool).ok_or_else(unconvertible),
            ValueType::Int => json
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(Value::Int)
                .ok_or_else(unconvertible),
            ValueType::Long => json.as_i64().map(Value::Long).ok_or_else(unconvertible),
            ValueType::Float => json.as_f64().map(Value::Float).ok_or_else(unconvertible),
            ValueType::Timestamp => json
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
                .ok_or_else(unconvertible),
            ValueType::Bytes => match json {
                Json::Array(items) => items
                    .iter()
                    .map(|x| x.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()
                    .map(Value::Bytes)
                    .ok_or_else(unconvertible),
                Json::String(s) => BASE64
                    .decode(s)
                    .map(Value::Bytes)
                    .map_err(|_| unconvertible()),
                _ => Err(unconvertible()),
            },
            ValueType::Enum(_) => json
                .as_str()
                .map(|s| Value::Symbol(s.to_string()))
                .ok_or_else(unconvertible),
            ValueType::Reference(type_name) => match json {
                Json::String(id) => Ok(Value::String(id.clone())),
                Json::Object(obj) => {
                    if let Ok(reference) = serde_json::from_value::<DeferredReference>(json.clone())
                    {
                        return Ok(Value::Reference(reference));
                    }
                    let id = id_property
                        .and_then(|p| obj.get(p))
                        .and_then(|v| v.as_str())
                        .ok_or_else(unconvertible)?;
                    tracing::trace!(type_name = %type_name, id = %id, "embedded reference object");
                    Ok(Value::String(id.to_string()))
                }
                _ => Err(unconvertible()),
            },
        }
    }
}

/// JSON type name of a record value, for error messages
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Natural string form, as written by the untyped default codec
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) | Value::Symbol(s) => write!(f, "{}", s),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Bytes(b) => write!(f, "{}", BASE64.encode(b)),
            Value::Reference(r) => write!(f, "{}", r.id),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Value::Long(l)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<DeferredReference> for Value {
    fn from(r: DeferredReference) -> Self {
        Value::Reference(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map(Into::into).unwrap_or(Value::Null)
    }
}

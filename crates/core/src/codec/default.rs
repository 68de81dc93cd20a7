//! Untyped default codec.
//!
//! Encodes through the value's natural string form. Decoding tries the
//! conversion routes for the declared type in order: strings pass through,
//! then the type's parse route. Types without a parse route (enums without
//! declared variants, references) fail with a [`RestoreError`].
//!
//! Ordering is not preserved for numbers: `"10" < "9"`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use super::traits::ValueCodec;
use crate::error::{EncodeError, RestoreError};
use crate::value::{Value, ValueType};

/// Natural-string codec.
///
/// # Example
///
/// ```
/// use domainmap_core::codec::{DefaultCodec, ValueCodec};
/// use domainmap_core::{Value, ValueType};
///
/// let codec = DefaultCodec::new(ValueType::Int);
/// assert_eq!(codec.encode(&Value::Int(5)).unwrap(), "5");
/// assert_eq!(codec.decode("-12").unwrap(), Value::Int(-12));
/// assert!(codec.decode("twelve").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCodec {
    value_type: ValueType,
}

impl DefaultCodec {
    /// Codec decoding into `value_type`
    pub fn new(value_type: ValueType) -> Self {
        DefaultCodec { value_type }
    }

    /// Codec used for attributes absent from metadata
    ///
    /// Decodes everything as strings.
    pub fn untyped() -> Self {
        DefaultCodec {
            value_type: ValueType::String,
        }
    }
}

impl ValueCodec for DefaultCodec {
    fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        if value.is_null() {
            return Err(EncodeError::TypeMismatch {
                codec: self.codec_id().to_string(),
                expected: self.value_type.clone(),
                found: value.type_name(),
            });
        }
        Ok(value.to_string())
    }

    fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        let fail = |reason: String| RestoreError::new(stored, self.value_type.clone(), reason);
        match &self.value_type {
            ValueType::String => Ok(Value::String(stored.to_string())),
            ValueType::Bool => stored
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|e| fail(e.to_string())),
            ValueType::Int => stored
                .parse::<i32>()
                .map(Value::Int)
                .map_err(|e| fail(e.to_string())),
            ValueType::Long => stored
                .parse::<i64>()
                .map(Value::Long)
                .map_err(|e| fail(e.to_string())),
            ValueType::Float => stored
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| fail(e.to_string())),
            ValueType::Timestamp => DateTime::parse_from_rfc3339(stored)
                .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
                .map_err(|e| fail(e.to_string())),
            ValueType::Bytes => BASE64
                .decode(stored)
                .map(Value::Bytes)
                .map_err(|e| fail(e.to_string())),
            ValueType::Enum(_) | ValueType::Reference(_) => {
                Err(fail("no conversion route from string".to_string()))
            }
        }
    }

    fn codec_id(&self) -> &str {
        "default"
    }

    fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn is_ordered(&self) -> bool {
        matches!(self.value_type, ValueType::String | ValueType::Bool)
    }
}

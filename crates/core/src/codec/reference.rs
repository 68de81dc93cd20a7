//! Domain-reference codec
//!
//! A property pointing at an object of another mapped domain is stored as
//! that object's identifier. Decoding does not fetch anything: it yields a
//! [`DeferredReference`] which the query layer can turn into a lookup
//! against the target domain.

use super::traits::ValueCodec;
use crate::error::{EncodeError, RestoreError};
use crate::value::{DeferredReference, Value, ValueType};

/// Codec storing references by identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCodec {
    value_type: ValueType,
    domain: String,
}

impl ReferenceCodec {
    /// Codec for references to `type_name`, stored in `domain`
    pub fn new(type_name: impl Into<String>, domain: impl Into<String>) -> Self {
        ReferenceCodec {
            value_type: ValueType::Reference(type_name.into()),
            domain: domain.into(),
        }
    }

    /// Referenced type name
    pub fn type_name(&self) -> &str {
        match &self.value_type {
            ValueType::Reference(name) => name,
            _ => "",
        }
    }

    /// Domain holding the referenced items
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl ValueCodec for ReferenceCodec {
    fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        match value {
            Value::Reference(r) => Ok(r.id.clone()),
            Value::String(id) => Ok(id.clone()),
            other => Err(EncodeError::TypeMismatch {
                codec: self.codec_id().to_string(),
                expected: self.value_type.clone(),
                found: other.type_name(),
            }),
        }
    }

    fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        if stored.is_empty() {
            return Err(RestoreError::new(
                stored,
                self.value_type.clone(),
                "empty identifier",
            ));
        }
        Ok(Value::Reference(DeferredReference::new(
            self.domain.clone(),
            self.type_name(),
            stored,
        )))
    }

    fn codec_id(&self) -> &str {
        "reference"
    }

    fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    fn is_ordered(&self) -> bool {
        true
    }
}

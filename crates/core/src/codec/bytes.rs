//! Base64 codec for binary attributes

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::traits::ValueCodec;
use crate::error::{EncodeError, RestoreError};
use crate::value::{Value, ValueType};

/// Standard-alphabet base64 codec (unordered)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64Codec;

impl ValueCodec for Base64Codec {
    fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        match value {
            Value::Bytes(b) => Ok(BASE64.encode(b)),
            other => Err(EncodeError::TypeMismatch {
                codec: self.codec_id().to_string(),
                expected: ValueType::Bytes,
                found: other.type_name(),
            }),
        }
    }

    fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        BASE64
            .decode(stored)
            .map(Value::Bytes)
            .map_err(|e| RestoreError::new(stored, ValueType::Bytes, e.to_string()))
    }

    fn codec_id(&self) -> &str {
        "base64"
    }

    fn value_type(&self) -> &ValueType {
        &ValueType::Bytes
    }
}

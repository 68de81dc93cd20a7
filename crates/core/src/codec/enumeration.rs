//! Enum codec
//!
//! Enum constants are stored by their symbolic name. The name is validated
//! against the declared variants in both directions.

use super::traits::ValueCodec;
use crate::error::{EncodeError, RestoreError};
use crate::value::{Value, ValueType};

/// Codec storing enum constants by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCodec {
    value_type: ValueType,
    variants: Vec<String>,
}

impl EnumCodec {
    /// Codec for enum `type_name` with the given variant names
    pub fn new(type_name: impl Into<String>, variants: Vec<String>) -> Self {
        EnumCodec {
            value_type: ValueType::Enum(type_name.into()),
            variants,
        }
    }

    /// Enum type name
    pub fn type_name(&self) -> &str {
        match &self.value_type {
            ValueType::Enum(name) => name,
            _ => "",
        }
    }

    /// Declared variant names
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    fn is_variant(&self, symbol: &str) -> bool {
        self.variants.iter().any(|v| v == symbol)
    }
}

impl ValueCodec for EnumCodec {
    fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        let symbol = match value {
            Value::Symbol(s) | Value::String(s) => s,
            other => {
                return Err(EncodeError::TypeMismatch {
                    codec: self.codec_id().to_string(),
                    expected: self.value_type.clone(),
                    found: other.type_name(),
                })
            }
        };
        if !self.is_variant(symbol) {
            return Err(EncodeError::UnknownVariant {
                type_name: self.type_name().to_string(),
                symbol: symbol.clone(),
            });
        }
        Ok(symbol.clone())
    }

    fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        if self.is_variant(stored) {
            Ok(Value::Symbol(stored.to_string()))
        } else {
            Err(RestoreError::new(
                stored,
                self.value_type.clone(),
                format!("not a variant of {}", self.type_name()),
            ))
        }
    }

    fn codec_id(&self) -> &str {
        "enum"
    }

    fn value_type(&self) -> &ValueType {
        &self.value_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> EnumCodec {
        EnumCodec::new("Color", vec!["RED".into(), "GREEN".into()])
    }

    #[test]
    fn test_encode_by_name() {
        assert_eq!(color().encode(&Value::Symbol("RED".into())).unwrap(), "RED");
        assert_eq!(color().encode(&Value::from("GREEN")).unwrap(), "GREEN");
    }

    #[test]
    fn test_unknown_variant() {
        let err = color().encode(&Value::Symbol("BLUE".into())).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownVariant { .. }));
        assert!(color().decode("red").is_err());
    }

    #[test]
    fn test_decode_to_symbol() {
        assert_eq!(color().decode("GREEN").unwrap(), Value::Symbol("GREEN".into()));
    }

    #[test]
    fn test_wrong_value_type() {
        assert!(color().encode(&Value::Int(1)).is_err());
    }
}

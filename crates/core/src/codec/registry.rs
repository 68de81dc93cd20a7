//! Codec registry
//!
//! Maps codec ids to factories. Properties declared with a custom encoding
//! name their codec by id; the metadata builder asks the registry for an
//! instance when the property is introspected.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::{Base64Codec, DefaultCodec, EnumCodec, TimestampCodec, ValueCodec};
use crate::value::ValueType;

/// What a factory knows about the property it builds a codec for
#[derive(Debug, Clone, Copy)]
pub struct CodecContext<'a> {
    /// Declared value type
    pub value_type: &'a ValueType,
    /// Declared enum variants (empty for non-enum properties)
    pub variants: &'a [String],
}

impl<'a> CodecContext<'a> {
    /// Context for a property without enum variants
    pub fn new(value_type: &'a ValueType) -> Self {
        CodecContext {
            value_type,
            variants: &[],
        }
    }
}

/// Codec constructor stored in the registry
pub type CodecFactory = Arc<dyn Fn(CodecContext<'_>) -> Arc<dyn ValueCodec> + Send + Sync>;

/// Ids registered by [`CodecRegistry::new`]
pub const BUILTIN_CODECS: &[&str] = &["default", "enum", "timestamp", "base64", "bool"];

static BUILTINS: Lazy<CodecRegistry> = Lazy::new(CodecRegistry::new);

static UNTYPED: Lazy<Arc<dyn ValueCodec>> = Lazy::new(|| Arc::new(DefaultCodec::untyped()));

/// Registry of codec factories by id
#[derive(Clone)]
pub struct CodecRegistry {
    factories: FxHashMap<String, CodecFactory>,
}

impl CodecRegistry {
    /// Registry holding the built-in codecs
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("default", |ctx| default_codec_for(ctx.value_type));
        registry.register("enum", |ctx| {
            let name = match ctx.value_type {
                ValueType::Enum(name) => name.clone(),
                other => other.to_string(),
            };
            Arc::new(EnumCodec::new(name, ctx.variants.to_vec())) as Arc<dyn ValueCodec>
        });
        registry.register("timestamp", |_| Arc::new(TimestampCodec) as Arc<dyn ValueCodec>);
        registry.register("base64", |_| Arc::new(Base64Codec) as Arc<dyn ValueCodec>);
        registry.register("bool", |_| {
            Arc::new(DefaultCodec::new(ValueType::Bool)) as Arc<dyn ValueCodec>
        });
        registry
    }

    /// Registry with no codecs at all
    pub fn empty() -> Self {
        CodecRegistry {
            factories: FxHashMap::default(),
        }
    }

    /// Shared registry holding only the built-in codecs
    pub fn builtins() -> &'static CodecRegistry {
        &BUILTINS
    }

    /// Register a factory under `id`, replacing any previous one
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(CodecContext<'_>) -> Arc<dyn ValueCodec> + Send + Sync + 'static,
    {
        let id = id.into();
        tracing::debug!(codec = %id, "registered codec");
        self.factories.insert(id, Arc::new(factory));
    }

    /// Register one shared codec instance under `id`
    pub fn register_codec<C>(&mut self, id: impl Into<String>, codec: C)
    where
        C: ValueCodec + 'static,
    {
        let codec: Arc<dyn ValueCodec> = Arc::new(codec);
        self.register(id, move |_| Arc::clone(&codec));
    }

    /// Instantiate the codec registered under `id`
    pub fn get(&self, id: &str, ctx: CodecContext<'_>) -> Option<Arc<dyn ValueCodec>> {
        self.factories.get(id).map(|factory| factory(ctx))
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

/// Type-based default codec
///
/// This is also what the registry's `default` id resolves to.
///
/// Timestamps and bytes get their dedicated codecs; every other type uses
/// the natural-string [`DefaultCodec`]. Enum and reference properties are
/// handled by the metadata builder, which knows their variants and target
/// domain.
pub fn default_codec_for(value_type: &ValueType) -> Arc<dyn ValueCodec> {
    match value_type {
        ValueType::Timestamp => Arc::new(TimestampCodec),
        ValueType::Bytes => Arc::new(Base64Codec),
        other => Arc::new(DefaultCodec::new(other.clone())),
    }
}

/// Shared natural-string codec for attributes absent from metadata
pub fn untyped() -> Arc<dyn ValueCodec> {
    Arc::clone(&UNTYPED)
}

/// Get a built-in codec by its identifier.
///
/// Returns `None` for ids that are not built in.
pub fn get_codec(codec_id: &str, value_type: &ValueType) -> Option<Arc<dyn ValueCodec>> {
    CodecRegistry::builtins().get(codec_id, CodecContext::new(value_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IntegerCodec;
    use crate::value::Value;

    #[test]
    fn test_builtins_registered() {
        let registry = CodecRegistry::new();
        for id in BUILTIN_CODECS {
            assert!(registry.contains(id), "missing {}", id);
        }
        assert_eq!(registry.ids().len(), BUILTIN_CODECS.len());
    }

    #[test]
    fn test_get_builtin_codec() {
        let codec = get_codec("timestamp", &ValueType::Timestamp).unwrap();
        assert_eq!(codec.codec_id(), "timestamp");
    }

    #[test]
    fn test_get_unknown_codec() {
        assert!(get_codec("rot13", &ValueType::String).is_none());
    }

    #[test]
    fn test_enum_factory_uses_variants() {
        let variants = vec!["ON".to_string(), "OFF".to_string()];
        let value_type = ValueType::Enum("Switch".into());
        let codec = CodecRegistry::new()
            .get(
                "enum",
                CodecContext {
                    value_type: &value_type,
                    variants: &variants,
                },
            )
            .unwrap();
        assert_eq!(codec.decode("ON").unwrap(), Value::Symbol("ON".into()));
        assert!(codec.decode("DIM").is_err());
    }

    #[test]
    fn test_register_custom_codec() {
        let mut registry = CodecRegistry::new();
        registry.register_codec("cents", IntegerCodec::long(12, 0));
        let codec = registry
            .get("cents", CodecContext::new(&ValueType::Long))
            .unwrap();
        assert_eq!(codec.encode(&Value::Long(250)).unwrap(), "000000000250");
    }

    #[test]
    fn test_default_codec_for_types() {
        assert_eq!(default_codec_for(&ValueType::Timestamp).codec_id(), "timestamp");
        assert_eq!(default_codec_for(&ValueType::Bytes).codec_id(), "base64");
        assert_eq!(default_codec_for(&ValueType::Int).codec_id(), "default");
        assert_eq!(untyped().value_type(), &ValueType::String);
    }
}

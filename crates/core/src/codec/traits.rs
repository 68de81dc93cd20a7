//! Value codec trait definitions.

use std::fmt;

use crate::error::{EncodeError, RestoreError};
use crate::value::{Value, ValueType};

/// Value codec trait.
///
/// Every attribute value crossing into or out of the store goes through a
/// codec. The store compares strings byte-wise, so a codec decides both the
/// stored representation and whether that representation sorts like the
/// typed value.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync`: descriptors holding them are shared across
/// threads once metadata is built, and matchers bind the same instances.
///
/// # Codec Identity
///
/// Each codec has an identifier. Custom codecs are looked up by this id in
/// the [`CodecRegistry`](super::CodecRegistry).
pub trait ValueCodec: Send + Sync + fmt::Debug {
    /// Encode a typed value into its stored string.
    ///
    /// The result is unquoted; quoting belongs to the query renderer.
    fn encode(&self, value: &Value) -> Result<String, EncodeError>;

    /// Decode a stored string back into a typed value.
    ///
    /// Returns a [`RestoreError`] carrying the offending string and the
    /// target type when no valid value can be produced.
    fn decode(&self, stored: &str) -> Result<Value, RestoreError>;

    /// Unique codec identifier.
    fn codec_id(&self) -> &str;

    /// Value type this codec produces on decode.
    fn value_type(&self) -> &ValueType;

    /// Whether encoded strings sort in the same order as the typed values.
    fn is_ordered(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that trait is object-safe
    fn _accepts_box_dyn_codec(_codec: Box<dyn ValueCodec>) {}
}

//! Value codec abstraction.
//!
//! Every value crossing into or out of the attribute store goes through a
//! [`ValueCodec`]. The store only holds strings and only compares them
//! byte-wise, so numeric and temporal codecs write fixed-width strings that
//! sort like the values they encode.
//!
//! # Codecs
//!
//! | Codec | Id | Ordered |
//! |-------|----|---------|
//! | [`DefaultCodec`] | `default` | strings only |
//! | [`IntegerCodec`] | `numeric` | when padded or offset |
//! | [`FloatCodec`] | `numeric-float` | when padded or offset |
//! | [`EnumCodec`] | `enum` | no |
//! | [`ReferenceCodec`] | `reference` | by identifier |
//! | [`TimestampCodec`] | `timestamp` | yes |
//! | [`Base64Codec`] | `base64` | no |
//!
//! # Usage
//!
//! ```
//! use domainmap_core::codec::{IntegerCodec, ValueCodec};
//! use domainmap_core::Value;
//!
//! let codec = IntegerCodec::int(3, 0);
//! assert_eq!(codec.encode(&Value::Int(5)).unwrap(), "005");
//! ```

mod bytes;
mod default;
mod enumeration;
mod numeric;
mod reference;
mod registry;
mod timestamp;
mod traits;

pub use bytes::Base64Codec;
pub use default::DefaultCodec;
pub use enumeration::EnumCodec;
pub use numeric::{FloatCodec, IntegerCodec, MAX_DIGITS};
pub use reference::ReferenceCodec;
pub use registry::{
    default_codec_for, get_codec, untyped, CodecContext, CodecFactory, CodecRegistry,
    BUILTIN_CODECS,
};
pub use timestamp::{TimestampCodec, TIMESTAMP_FORMAT};
pub use traits::ValueCodec;

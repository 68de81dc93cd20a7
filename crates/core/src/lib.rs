//! Core types for domainmap
//!
//! This crate defines the foundational types shared by the metadata and
//! query crates:
//! - Value, ValueType, ContainerType: the typed value model
//! - ValueCodec and its implementations: typed value ⇄ stored string
//! - CodecRegistry: custom codecs by id
//! - PropertyPath: dotted paths into object records
//! - Limits, name validation: store quotas
//! - MapperConfig: `domainmap.toml`
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod error;
pub mod limits;
pub mod name;
pub mod path;
pub mod value;

pub use codec::{CodecContext, CodecRegistry, ValueCodec};
pub use config::{MapperConfig, CONFIG_FILE_NAME};
pub use error::{ConfigurationError, EncodeError, Error, RestoreError, Result};
pub use limits::{LimitError, Limits};
pub use name::{validate_name, validate_name_with_limits, NameError, ITEM_NAME};
pub use path::{get_at_path, set_at_path, PathError, PropertyPath};
pub use value::{json_type_name, ContainerType, DeferredReference, Value, ValueType};

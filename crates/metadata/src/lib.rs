//! Domain metadata for domainmap
//!
//! Describes how the properties of structural types project onto flat,
//! string-valued attributes:
//! - Schema: explicit property descriptions, in code or TOML
//! - AttributeKey, AttributeDescriptor, AttributeStore: the mapped attributes
//! - Accessor, InstanceFactory: reading and writing through dotted paths
//! - MetadataBuilder: schema → DomainMetadata, with flattening
//! - MetadataRegistry: build-once cache
//! - Mapping: object ⇄ item conversion

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod attribute;
pub mod builder;
pub mod mapping;
pub mod metadata;
pub mod registry;
pub mod schema;
pub mod store;

pub use accessor::{Accessor, BlankObjectFactory, InstanceFactory};
pub use attribute::{AttributeDescriptor, AttributeKey};
pub use builder::MetadataBuilder;
pub use mapping::{from_item, item_to_record, record_to_item, to_item, Item, ItemAttribute, RestorePolicy};
pub use metadata::DomainMetadata;
pub use registry::{MetadataKey, MetadataRegistry};
pub use schema::{
    ContainerSpec, DomainSchema, Encoding, PropertyRole, PropertySchema, PropertyShape,
    SchemaCatalog, CLASS_PROPERTY,
};
pub use store::AttributeStore;

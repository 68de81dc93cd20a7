//! domainmap - typed object mapping for string-only attribute stores
//!
//! The store keeps items as flat bags of string attributes and compares
//! values byte-wise. domainmap describes structured objects declaratively,
//! projects them onto attributes with encodings that keep numeric order
//! under string comparison, and renders typed queries into the store's
//! query language.
//!
//! # Quick Start
//!
//! ```
//! use domainmap::{condition, greater_than, Mapper, Select};
//! use domainmap::schema::{DomainSchema, Encoding, PropertySchema, SchemaCatalog};
//! use domainmap::ValueType;
//!
//! let catalog = SchemaCatalog::new()
//!     .with(
//!         DomainSchema::new("Person")
//!             .domain("people")
//!             .property(PropertySchema::identifier("id"))
//!             .property(PropertySchema::scalar("age", ValueType::Int).encoding(Encoding::padded(3, 0))),
//!     )
//!     .unwrap();
//! let mapper = Mapper::new(catalog);
//!
//! let query = mapper
//!     .render("Person", &Select::all().filter(condition("age", greater_than(17))))
//!     .unwrap();
//! assert_eq!(query.text, "select * from `people` where `age` > '017'");
//! ```
//!
//! # Architecture
//!
//! - `domainmap-core`: values, codecs, errors, limits, configuration
//! - `domainmap-metadata`: schemas, attribute stores, metadata builder, mapping
//! - `domainmap-query`: matchers, conditions, select rendering
//!
//! [`Mapper`] ties them together behind one configuration.

pub mod mapper;

pub use mapper::Mapper;

pub use domainmap_core::{
    codec, CodecContext, CodecRegistry, ConfigurationError, ContainerType, DeferredReference,
    EncodeError, Error, Limits, MapperConfig, RestoreError, Result, Value, ValueCodec, ValueType,
    CONFIG_FILE_NAME, ITEM_NAME,
};
pub use domainmap_metadata::{
    AttributeDescriptor, DomainMetadata, InstanceFactory, Item, ItemAttribute, RestorePolicy,
};
pub use domainmap_query::{
    between, condition, greater_equal, greater_than, group, is, is_in, is_not, is_not_null,
    is_null, less_equal, less_than, like, not, not_like, where_item_name, Condition, Direction,
    Matcher, Projection, RenderOptions, RenderedQuery, Select,
};

/// Schema description types
pub mod schema {
    pub use domainmap_metadata::{
        ContainerSpec, DomainSchema, Encoding, PropertyRole, PropertySchema, PropertyShape,
        SchemaCatalog,
    };
}

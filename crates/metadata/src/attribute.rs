//! Attribute keys and descriptors

use std::fmt;
use std::sync::Arc;

use domainmap_core::{
    ContainerType, EncodeError, PropertyPath, RestoreError, Value, ValueCodec, ValueType,
};
use serde::{Deserialize, Serialize};

use crate::accessor::Accessor;

/// Unique key of a mapped attribute
///
/// Uniqueness is over the full triple: the same name may appear with a
/// different value or container type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeKey {
    /// Attribute name
    pub name: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Container kind
    pub container: ContainerType,
}

impl AttributeKey {
    /// Create a key
    pub fn new(name: impl Into<String>, value_type: ValueType, container: ContainerType) -> Self {
        AttributeKey {
            name: name.into(),
            value_type,
            container,
        }
    }

    /// Key of a scalar attribute
    pub fn scalar(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, value_type, ContainerType::Scalar)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}<{}>", self.name, self.container, self.value_type)
    }
}

/// One mapped attribute: key, codec, accessor and declaring type
///
/// Created once by the metadata builder and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    key: AttributeKey,
    codec: Arc<dyn ValueCodec>,
    accessor: Accessor,
    declaring_type: String,
    id_property: Option<String>,
}

impl AttributeDescriptor {
    /// Create a descriptor
    pub fn new(
        key: AttributeKey,
        codec: Arc<dyn ValueCodec>,
        accessor: Accessor,
        declaring_type: impl Into<String>,
    ) -> Self {
        AttributeDescriptor {
            key,
            codec,
            accessor,
            declaring_type: declaring_type.into(),
            id_property: None,
        }
    }

    /// Identifier property of the referenced type, for reference attributes
    ///
    /// Used to read embedded objects of the referenced type.
    pub fn with_id_property(mut self, id_property: impl Into<String>) -> Self {
        self.id_property = Some(id_property.into());
        self
    }

    /// Attribute key
    pub fn key(&self) -> &AttributeKey {
        &self.key
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Declared value type
    pub fn value_type(&self) -> &ValueType {
        &self.key.value_type
    }

    /// Container kind
    pub fn container(&self) -> ContainerType {
        self.key.container
    }

    /// Bound codec
    pub fn codec(&self) -> &Arc<dyn ValueCodec> {
        &self.codec
    }

    /// Bound accessor
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// Dotted property path
    pub fn path(&self) -> &PropertyPath {
        self.accessor.path()
    }

    /// Structural type that declared the property
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Identifier property of the referenced type
    pub fn id_property(&self) -> Option<&str> {
        self.id_property.as_deref()
    }

    /// Encode through the bound codec
    pub fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        self.codec.encode(value)
    }

    /// Decode through the bound codec
    pub fn decode(&self, stored: &str) -> Result<Value, RestoreError> {
        self.codec.decode(stored)
    }

    /// Convert a record field to a typed value of the declared type
    pub fn value_from_json(&self, json: &serde_json::Value) -> Result<Value, EncodeError> {
        Value::from_json(json, &self.key.value_type, self.id_property.as_deref())
    }
}

//! Domain metadata
//!
//! One [`DomainMetadata`] exists per (structural type, domain, parent path).
//! It owns the [`AttributeStore`] of the type, with flattened sub-objects
//! already merged in, and keeps the identifier attribute apart: the
//! identifier is the item name, not a stored attribute.

use std::sync::Arc;

use domainmap_core::{ContainerType, PropertyPath, ValueType};

use crate::attribute::{AttributeDescriptor, AttributeKey};
use crate::store::AttributeStore;

/// Attribute metadata of one mapped type in one domain
#[derive(Debug, Clone)]
pub struct DomainMetadata {
    type_name: String,
    domain: String,
    parent: PropertyPath,
    identifier: Option<Arc<AttributeDescriptor>>,
    store: AttributeStore,
}

impl DomainMetadata {
    pub(crate) fn new(
        type_name: impl Into<String>,
        domain: impl Into<String>,
        parent: PropertyPath,
        identifier: Option<Arc<AttributeDescriptor>>,
        store: AttributeStore,
    ) -> Self {
        DomainMetadata {
            type_name: type_name.into(),
            domain: domain.into(),
            parent,
            identifier,
            store,
        }
    }

    /// Mapped structural type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Domain name
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Parent property path (root unless built for a flattened property)
    pub fn parent_path(&self) -> &PropertyPath {
        &self.parent
    }

    /// Whether an attribute with this name is mapped
    pub fn is_attribute_defined(&self, name: &str) -> bool {
        self.store.contains_name(name)
    }

    /// Attribute by plain name
    pub fn attribute(&self, name: &str) -> Option<&Arc<AttributeDescriptor>> {
        self.store.get_by_name(name)
    }

    /// Attribute by full key
    pub fn attribute_exact(
        &self,
        name: &str,
        value_type: &ValueType,
        container: ContainerType,
    ) -> Option<&Arc<AttributeDescriptor>> {
        self.store
            .get(&AttributeKey::new(name, value_type.clone(), container))
    }

    /// The identifier (item name) attribute
    pub fn identifier_attribute(&self) -> Option<&Arc<AttributeDescriptor>> {
        self.identifier.as_ref()
    }

    /// Mapped attributes in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &Arc<AttributeDescriptor>> {
        self.store.iter()
    }

    /// Underlying attribute store
    pub fn store(&self) -> &AttributeStore {
        &self.store
    }
}

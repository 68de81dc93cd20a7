//! Attribute store
//!
//! Maps [`AttributeKey`] to [`AttributeDescriptor`], keeping declaration
//! order, plus two auxiliary indexes from plain attribute name to value type
//! and container type. Query leaves only carry a name; the indexes rebuild
//! the full key for them.
//!
//! ## Contract
//!
//! - A plain attribute name appears at most once. Inserting a second
//!   descriptor with the same name is a [`ConfigurationError`] naming both
//!   declaring types, whether it comes from a merge or a direct insert.
//! - Iteration follows insertion order.

use std::sync::Arc;

use domainmap_core::{ConfigurationError, ContainerType, ValueType};
use rustc_hash::FxHashMap;

use crate::attribute::{AttributeDescriptor, AttributeKey};

/// Descriptors by key, with name indexes
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    descriptors: FxHashMap<AttributeKey, Arc<AttributeDescriptor>>,
    order: Vec<AttributeKey>,
    value_types: FxHashMap<String, ValueType>,
    containers: FxHashMap<String, ContainerType>,
}

impl AttributeStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateAttribute`] if the name is taken.
    pub fn insert(&mut self, descriptor: AttributeDescriptor) -> Result<(), ConfigurationError> {
        self.insert_shared(Arc::new(descriptor))
    }

    fn insert_shared(&mut self, descriptor: Arc<AttributeDescriptor>) -> Result<(), ConfigurationError> {
        if let Some(existing) = self.get_by_name(descriptor.name()) {
            return Err(ConfigurationError::DuplicateAttribute {
                attribute: descriptor.name().to_string(),
                existing_type: existing.declaring_type().to_string(),
                incoming_type: descriptor.declaring_type().to_string(),
            });
        }
        let key = descriptor.key().clone();
        self.value_types
            .insert(key.name.clone(), key.value_type.clone());
        self.containers.insert(key.name.clone(), key.container);
        self.order.push(key.clone());
        self.descriptors.insert(key, descriptor);
        Ok(())
    }

    /// Merge every descriptor of `other` into this store
    ///
    /// Stops at the first duplicate name; the store is left with the
    /// descriptors merged so far, and the caller is expected to discard it.
    pub fn merge(&mut self, other: &AttributeStore) -> Result<(), ConfigurationError> {
        for descriptor in other.iter() {
            self.insert_shared(Arc::clone(descriptor))?;
        }
        Ok(())
    }

    /// Descriptor by full key
    pub fn get(&self, key: &AttributeKey) -> Option<&Arc<AttributeDescriptor>> {
        self.descriptors.get(key)
    }

    /// Descriptor by plain name, through the name indexes
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<AttributeDescriptor>> {
        let key = AttributeKey::new(
            name,
            self.value_types.get(name)?.clone(),
            *self.containers.get(name)?,
        );
        self.descriptors.get(&key)
    }

    /// Whether an attribute with this name exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.value_types.contains_key(name)
    }

    /// Declared value type of a name
    pub fn value_type(&self, name: &str) -> Option<&ValueType> {
        self.value_types.get(name)
    }

    /// Declared container type of a name
    pub fn container_type(&self, name: &str) -> Option<ContainerType> {
        self.containers.get(name).copied()
    }

    /// Descriptors in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AttributeDescriptor>> {
        self.order.iter().filter_map(|key| self.descriptors.get(key))
    }

    /// Attribute names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|key| key.name.as_str())
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

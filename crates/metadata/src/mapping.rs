//! Object ⇄ item conversion
//!
//! Objects travel as JSON records, so any `Serialize`/`DeserializeOwned`
//! type can be mapped. [`to_item`] reads every mapped attribute through its
//! accessor and encodes it; [`from_item`] decodes stored values and writes
//! them back, creating intermediate objects where the accessor allows it.
//!
//! ## Contract
//!
//! - The identifier becomes the item name and is never a stored attribute.
//! - Null and absent properties produce no stored value.
//! - Multi-valued properties produce one stored value per element; sets
//!   drop duplicate encodings.
//! - Stored attributes without a mapped descriptor are ignored on read.
//! - What happens on a [`RestoreError`](domainmap_core::RestoreError) is the
//!   caller's choice, through [`RestorePolicy`].

use domainmap_core::{
    json_type_name, ContainerType, EncodeError, Limits, Result, Value,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeDescriptor;
use crate::metadata::DomainMetadata;

/// One stored attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttribute {
    /// Attribute name
    pub name: String,
    /// Encoded value
    pub value: String,
}

/// A stored item: its name and its attribute values
///
/// Multi-valued attributes repeat their name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item name (the object's identifier)
    pub name: String,
    /// Attribute values in write order
    pub attributes: Vec<ItemAttribute>,
}

impl Item {
    /// Item with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Item {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Append a value
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push(ItemAttribute {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Values stored under `name`, in order
    pub fn values<'a: 'n, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n {
        self.attributes
            .iter()
            .filter(move |a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// First value stored under `name`
    pub fn first<'a>(&'a self, name: &str) -> Option<&'a str> {
        self.values(name).next()
    }

    /// Distinct attribute names, in first-seen order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for a in &self.attributes {
            if !names.contains(&a.name.as_str()) {
                names.push(&a.name);
            }
        }
        names
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether no values are stored
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// What to do with a stored value that cannot be restored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePolicy {
    /// Fail the whole conversion
    #[default]
    Abort,
    /// Leave the property unset and log a warning
    Skip,
}

/// Encode an object into an item
pub fn to_item<T: Serialize>(metadata: &DomainMetadata, object: &T, limits: &Limits) -> Result<Item> {
    let record = serde_json::to_value(object)?;
    record_to_item(metadata, &record, limits)
}

/// Encode a JSON record into an item
///
/// # Errors
///
/// * [`EncodeError::MissingIdentifier`] - the identifier is absent or empty
/// * [`EncodeError`] - a property does not fit its codec
/// * [`LimitError`](domainmap_core::LimitError) - an encoded value or the item is too large
pub fn record_to_item(
    metadata: &DomainMetadata,
    record: &serde_json::Value,
    limits: &Limits,
) -> Result<Item> {
    let missing_identifier = || EncodeError::MissingIdentifier {
        type_name: metadata.type_name().to_string(),
    };
    let identifier = metadata
        .identifier_attribute()
        .ok_or_else(missing_identifier)?;
    let name = identifier
        .accessor()
        .get(record)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(missing_identifier)?;
    limits.validate_name_length(name)?;

    let mut item = Item::new(name);
    for descriptor in metadata.attributes() {
        let json = match descriptor.accessor().get(record) {
            Some(json) if !json.is_null() => json,
            _ => continue,
        };

        if descriptor.container().is_multi() {
            let elements = json.as_array().ok_or_else(|| EncodeError::Unconvertible {
                expected: descriptor.value_type().clone(),
                found: json_type_name(json),
            })?;
            let mut written: Vec<String> = Vec::with_capacity(elements.len());
            for element in elements.iter().filter(|e| !e.is_null()) {
                let encoded = encode(descriptor, element, limits)?;
                if descriptor.container() == ContainerType::Set && written.contains(&encoded) {
                    continue;
                }
                written.push(encoded);
            }
            for encoded in written {
                item.push(descriptor.name(), encoded);
            }
        } else {
            let encoded = encode(descriptor, json, limits)?;
            item.push(descriptor.name(), encoded);
        }
    }

    limits.validate_item_size(item.len())?;
    tracing::trace!(item = %item.name, values = item.len(), "encoded item");
    Ok(item)
}

fn encode(
    descriptor: &AttributeDescriptor,
    json: &serde_json::Value,
    limits: &Limits,
) -> Result<String> {
    let value = descriptor.value_from_json(json)?;
    let encoded = descriptor.encode(&value)?;
    limits.validate_encoded_value(descriptor.name(), &encoded)?;
    Ok(encoded)
}

/// Decode an item into an object
pub fn from_item<T: DeserializeOwned>(
    metadata: &DomainMetadata,
    item: &Item,
    policy: RestorePolicy,
) -> Result<T> {
    let record = item_to_record(metadata, item, policy)?;
    Ok(serde_json::from_value(record)?)
}

/// Decode an item into a JSON record
///
/// # Errors
///
/// * [`RestoreError`](domainmap_core::RestoreError) - a stored value cannot be
///   decoded and `policy` is [`RestorePolicy::Abort`]
/// * [`PathError`](domainmap_core::PathError) - a nested property cannot be written
pub fn item_to_record(
    metadata: &DomainMetadata,
    item: &Item,
    policy: RestorePolicy,
) -> Result<serde_json::Value> {
    let mut record = serde_json::Value::Object(serde_json::Map::new());
    if let Some(identifier) = metadata.identifier_attribute() {
        identifier
            .accessor()
            .set(&mut record, serde_json::Value::String(item.name.clone()))?;
    }

    for descriptor in metadata.attributes() {
        let mut stored = item.values(descriptor.name()).peekable();
        if stored.peek().is_none() {
            continue;
        }

        if descriptor.container().is_multi() {
            let mut elements = Vec::new();
            for s in stored {
                if let Some(value) = restore(descriptor, s, policy)? {
                    elements.push(value.to_json());
                }
            }
            descriptor
                .accessor()
                .set(&mut record, serde_json::Value::Array(elements))?;
        } else {
            let first = stored.next().unwrap_or_default();
            if stored.next().is_some() {
                tracing::warn!(
                    item = %item.name,
                    attribute = %descriptor.name(),
                    "multiple values for scalar attribute, using the first"
                );
            }
            if let Some(value) = restore(descriptor, first, policy)? {
                descriptor.accessor().set(&mut record, value.to_json())?;
            }
        }
    }

    for name in item.names() {
        if !metadata.is_attribute_defined(name) {
            tracing::debug!(item = %item.name, attribute = %name, "ignoring unmapped attribute");
        }
    }
    Ok(record)
}

fn restore(
    descriptor: &AttributeDescriptor,
    stored: &str,
    policy: RestorePolicy,
) -> Result<Option<Value>> {
    match descriptor.decode(stored) {
        Ok(value) => Ok(Some(value)),
        Err(e) => match policy {
            RestorePolicy::Abort => Err(e.into()),
            RestorePolicy::Skip => {
                tracing::warn!(
                    attribute = %descriptor.name(),
                    value = %stored,
                    error = %e,
                    "skipping unrestorable value"
                );
                Ok(None)
            }
        },
    }
}

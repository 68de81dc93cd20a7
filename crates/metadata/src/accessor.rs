//! Property accessors
//!
//! An [`Accessor`] reads and writes one property of an object record through
//! its full dotted path. Writing through a missing or null intermediate
//! object is opt-in: with vivification enabled the accessor asks the
//! [`InstanceFactory`] for a blank instance of the intermediate's mapped
//! type, and falls back to an empty object for types it knows nothing about.

use std::fmt;
use std::sync::Arc;

use domainmap_core::{get_at_path, set_at_path, PathError, PropertyPath};

/// Constructs blank instances of mapped types
///
/// Closures `Fn(&str) -> Option<serde_json::Value>` implement this trait.
pub trait InstanceFactory: Send + Sync {
    /// Blank record for `type_name`, or `None` to refuse
    fn instantiate(&self, type_name: &str) -> Option<serde_json::Value>;
}

/// Factory producing an empty object for every type
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankObjectFactory;

impl InstanceFactory for BlankObjectFactory {
    fn instantiate(&self, _type_name: &str) -> Option<serde_json::Value> {
        Some(serde_json::Value::Object(serde_json::Map::new()))
    }
}

impl<F> InstanceFactory for F
where
    F: Fn(&str) -> Option<serde_json::Value> + Send + Sync,
{
    fn instantiate(&self, type_name: &str) -> Option<serde_json::Value> {
        self(type_name)
    }
}

/// Read/write capability bound to a dotted property path
#[derive(Clone)]
pub struct Accessor {
    path: PropertyPath,
    /// Mapped type of each intermediate object, outermost first
    intermediates: Vec<Option<String>>,
    factory: Option<Arc<dyn InstanceFactory>>,
}

impl Accessor {
    /// Accessor that never creates intermediates
    pub fn new(path: PropertyPath) -> Self {
        Accessor {
            path,
            intermediates: Vec::new(),
            factory: None,
        }
    }

    /// Enable write-through-null vivification
    ///
    /// `intermediates[i]` names the mapped type of the object at the path
    /// prefix of length `i + 1`; `None` entries get an empty object.
    pub fn with_vivify(
        mut self,
        factory: Arc<dyn InstanceFactory>,
        intermediates: Vec<Option<String>>,
    ) -> Self {
        self.factory = Some(factory);
        self.intermediates = intermediates;
        self
    }

    /// Bound path
    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// Whether missing intermediates are created on write
    pub fn vivifies(&self) -> bool {
        self.factory.is_some()
    }

    /// Read the property; absent and null intermediates read as `None`
    pub fn get<'a>(&self, record: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        get_at_path(record, &self.path)
    }

    /// Write the property
    ///
    /// # Errors
    ///
    /// * [`PathError::NullIntermediate`] - an intermediate is missing and
    ///   vivification is off or the factory refused
    /// * [`PathError::TypeMismatch`] - an intermediate is not an object
    pub fn set(&self, record: &mut serde_json::Value, value: serde_json::Value) -> Result<(), PathError> {
        let factory = match &self.factory {
            Some(factory) => factory,
            None => return set_at_path(record, &self.path, value, |_| None),
        };
        set_at_path(record, &self.path, value, |prefix| {
            match self.intermediates.get(prefix.len().saturating_sub(1)) {
                Some(Some(type_name)) => {
                    tracing::trace!(path = %prefix, type_name = %type_name, "vivifying intermediate");
                    factory.instantiate(type_name)
                }
                _ => Some(serde_json::Value::Object(serde_json::Map::new())),
            }
        })
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("path", &self.path.to_string())
            .field("vivify", &self.vivifies())
            .finish()
    }
}

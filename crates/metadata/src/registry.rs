//! Metadata registry
//!
//! Caches built [`DomainMetadata`] per (type, domain, parent path), so a
//! schema is walked once per process. Lookups take a read lock only; a miss
//! builds outside the lock and publishes the result under a short write
//! lock. When two threads race on the same miss, the first published entry
//! wins and both callers get it.
//!
//! Uses `parking_lot::RwLock` so a panicking builder cannot poison the cache.

use std::sync::Arc;

use domainmap_core::{PropertyPath, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::builder::MetadataBuilder;
use crate::metadata::DomainMetadata;

/// Cache key: structural type, domain and parent path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataKey {
    /// Structural type
    pub type_name: String,
    /// Domain name
    pub domain: String,
    /// Parent property path
    pub parent: PropertyPath,
}

impl MetadataKey {
    /// Key for a root-level build
    pub fn root(type_name: impl Into<String>, domain: impl Into<String>) -> Self {
        MetadataKey {
            type_name: type_name.into(),
            domain: domain.into(),
            parent: PropertyPath::root(),
        }
    }
}

/// Process-wide cache of built metadata
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: RwLock<FxHashMap<MetadataKey, Arc<DomainMetadata>>>,
}

impl MetadataRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata for `key`, if built
    pub fn get(&self, key: &MetadataKey) -> Option<Arc<DomainMetadata>> {
        self.entries.read().get(key).cloned()
    }

    /// Cached metadata for `key`, building it on a miss
    ///
    /// Build errors are returned and nothing is cached.
    pub fn get_or_build(
        &self,
        builder: &MetadataBuilder<'_>,
        key: &MetadataKey,
    ) -> Result<Arc<DomainMetadata>> {
        if let Some(found) = self.get(key) {
            return Ok(found);
        }

        let built = Arc::new(builder.build_for(&key.type_name, &key.domain, &key.parent)?);
        let mut entries = self.entries.write();
        tracing::debug!(
            type_name = %key.type_name,
            domain = %key.domain,
            "cached domain metadata"
        );
        let entry = entries.entry(key.clone()).or_insert(built);
        Ok(Arc::clone(entry))
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

//! High-level mapper
//!
//! The [`Mapper`] owns everything a process needs to map objects and render
//! queries: the configuration, the schema catalog, the codec registry and
//! the metadata cache.
//!
//! # Example
//!
//! ```text
//! use domainmap::{condition, is, Mapper, Select};
//!
//! let mapper = Mapper::open("/etc/myapp")?;
//! let item = mapper.to_item("Person", &person)?;
//! let query = mapper.render("Person", &mapper.select().filter(condition("age", is(5))))?;
//! ```

use std::path::Path;
use std::sync::Arc;

use domainmap_core::{
    CodecContext, CodecRegistry, DeferredReference, MapperConfig, Result, ValueCodec,
    CONFIG_FILE_NAME,
};
use domainmap_metadata::{
    item_to_record, record_to_item, BlankObjectFactory, DomainMetadata, InstanceFactory, Item,
    MetadataBuilder, MetadataKey, MetadataRegistry, RestorePolicy, SchemaCatalog,
};
use domainmap_query::{RenderOptions, RenderedQuery, Select};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Configured entry point for mapping and querying
///
/// Metadata is built lazily, once per (type, domain), and shared between
/// threads. Registering a codec or a factory drops the cache, since built
/// metadata holds the codecs and factory it was built with.
pub struct Mapper {
    config: MapperConfig,
    catalog: SchemaCatalog,
    codecs: CodecRegistry,
    registry: MetadataRegistry,
    factory: Arc<dyn InstanceFactory>,
    restore_policy: RestorePolicy,
}

impl Mapper {
    /// Mapper over `catalog` with the default configuration
    pub fn new(catalog: SchemaCatalog) -> Self {
        Mapper {
            config: MapperConfig::default(),
            catalog,
            codecs: CodecRegistry::new(),
            registry: MetadataRegistry::new(),
            factory: Arc::new(BlankObjectFactory),
            restore_policy: RestorePolicy::default(),
        }
    }

    /// Mapper over `catalog` with an explicit configuration
    ///
    /// Schema files named by the configuration are loaded into `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a schema file
    /// cannot be loaded.
    pub fn with_config(config: MapperConfig, mut catalog: SchemaCatalog) -> Result<Self> {
        config.validate()?;
        for file in &config.schema_files {
            catalog.load_file(file)?;
        }
        let mut mapper = Self::new(catalog);
        mapper.config = config;
        Ok(mapper)
    }

    /// Open the configuration in `dir`
    ///
    /// A default `domainmap.toml` is written first if the directory has
    /// none.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let config_path = dir.join(CONFIG_FILE_NAME);
        MapperConfig::write_default_if_missing(&config_path)?;
        Self::from_config_file(&config_path)
    }

    /// Load a mapper from a config file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = MapperConfig::from_file(path)?;
        let mapper = Self::with_config(config, SchemaCatalog::new())?;
        tracing::info!(
            path = %path.display(),
            types = mapper.catalog.len(),
            "opened mapper"
        );
        Ok(mapper)
    }

    /// Use `factory` for blank intermediate objects
    pub fn with_instance_factory(mut self, factory: Arc<dyn InstanceFactory>) -> Self {
        self.factory = factory;
        self.registry.clear();
        self
    }

    /// How [`Mapper::from_item`] treats undecodable values
    pub fn with_restore_policy(mut self, policy: RestorePolicy) -> Self {
        self.restore_policy = policy;
        self
    }

    /// Register a codec factory under `id`
    pub fn register_codec<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(CodecContext<'_>) -> Arc<dyn ValueCodec> + Send + Sync + 'static,
    {
        self.codecs.register(id, factory);
        self.registry.clear();
    }

    /// Active configuration
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Schema catalog
    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Codec registry
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    fn builder(&self) -> MetadataBuilder<'_> {
        MetadataBuilder::new(&self.catalog, &self.codecs)
            .instance_factory(Arc::clone(&self.factory))
            .limits(self.config.limits.clone())
            .auto_vivify(self.config.auto_vivify)
    }

    /// Metadata of `type_name` in its declared domain
    pub fn metadata(&self, type_name: &str) -> Result<Arc<DomainMetadata>> {
        let domain = self.catalog.get(type_name)?.domain_name().to_string();
        self.metadata_in(type_name, &domain)
    }

    /// Metadata of `type_name` stored in `domain`
    pub fn metadata_in(&self, type_name: &str, domain: &str) -> Result<Arc<DomainMetadata>> {
        self.registry
            .get_or_build(&self.builder(), &MetadataKey::root(type_name, domain))
    }

    /// Encode `object` as an item of `type_name`
    pub fn to_item<T: Serialize>(&self, type_name: &str, object: &T) -> Result<Item> {
        let metadata = self.metadata(type_name)?;
        let record = serde_json::to_value(object)?;
        record_to_item(&metadata, &record, &self.config.limits)
    }

    /// Decode an item of `type_name` into `T`
    pub fn from_item<T: DeserializeOwned>(&self, type_name: &str, item: &Item) -> Result<T> {
        let metadata = self.metadata(type_name)?;
        let record = item_to_record(&metadata, item, self.restore_policy)?;
        Ok(serde_json::from_value(record)?)
    }

    /// `select *` carrying the configured consistency
    pub fn select(&self) -> Select {
        Select::all().consistent_read(self.config.consistent_read)
    }

    /// Render `select` against the metadata of `type_name`
    ///
    /// A select without a limit gets the configured `default_limit`. The
    /// read is consistent if either the select or the configuration asks
    /// for it.
    pub fn render(&self, type_name: &str, select: &Select) -> Result<RenderedQuery> {
        let metadata = self.metadata(type_name)?;
        self.render_with(Some(&metadata), select)
    }

    /// Render the select fetching the item `reference` points at
    pub fn dereference(&self, reference: &DeferredReference) -> Result<RenderedQuery> {
        let select = Select::for_reference(reference);
        if self.catalog.contains(&reference.type_name) {
            let metadata = self.metadata_in(&reference.type_name, &reference.domain)?;
            self.render_with(Some(&metadata), &select)
        } else {
            self.render_with(None, &select)
        }
    }

    fn render_with(
        &self,
        metadata: Option<&DomainMetadata>,
        select: &Select,
    ) -> Result<RenderedQuery> {
        let options = RenderOptions {
            limits: self.config.limits.clone(),
            strict_attributes: self.config.strict_attributes,
        };
        let mut rendered = match (select.limit_value(), self.config.default_limit) {
            (None, Some(limit)) => select.clone().limit(limit).render(metadata, &options)?,
            _ => select.render(metadata, &options)?,
        };
        rendered.consistent_read |= self.config.consistent_read;
        Ok(rendered)
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &self.config)
            .field("types", &self.catalog.len())
            .field("codecs", &self.codecs)
            .field("cached", &self.registry.len())
            .field("restore_policy", &self.restore_policy)
            .finish()
    }
}

//! Domain metadata builder
//!
//! Walks a [`DomainSchema`] once and produces the [`DomainMetadata`] of the
//! type:
//!
//! 1. Properties are visited in declaration order. The `class`
//!    pseudo-property and transient properties are skipped.
//! 2. Value type and container type are determined. Collections and arrays
//!    must carry container metadata.
//! 3. Each property is classified by role and encoding directive: the
//!    identifier becomes the item-name attribute, flattened objects are built
//!    recursively and merged, and every other property gets the codec its
//!    encoding selects.
//! 4. An accessor is bound to the full dotted path.
//! 5. The descriptor is inserted into the attribute store.
//!
//! ## Contract
//!
//! Every failure is a [`ConfigurationError`]: a static defect of the schema,
//! reported once at build time and never retried.

use std::sync::Arc;

use domainmap_core::codec::{
    default_codec_for, EnumCodec, FloatCodec, IntegerCodec, ReferenceCodec,
};
use domainmap_core::{
    validate_name_with_limits, CodecContext, CodecRegistry, ConfigurationError, ContainerType,
    Limits, PropertyPath, Result, ValueCodec, ValueType,
};

use crate::accessor::{Accessor, BlankObjectFactory, InstanceFactory};
use crate::attribute::{AttributeDescriptor, AttributeKey};
use crate::metadata::DomainMetadata;
use crate::schema::{
    DomainSchema, Encoding, PropertyRole, PropertySchema, PropertyShape, SchemaCatalog,
    CLASS_PROPERTY,
};
use crate::store::AttributeStore;

/// Builds [`DomainMetadata`] from schemas in a catalog
pub struct MetadataBuilder<'a> {
    catalog: &'a SchemaCatalog,
    codecs: &'a CodecRegistry,
    factory: Arc<dyn InstanceFactory>,
    limits: Limits,
    auto_vivify: bool,
}

/// State of one level of flattening
struct Level<'p> {
    path: &'p PropertyPath,
    /// Mapped types of the intermediates on `path`
    intermediates: &'p [Option<String>],
    /// Types currently being flattened, outermost first
    stack: &'p [String],
}

impl<'a> MetadataBuilder<'a> {
    /// Builder over `catalog`, resolving custom codecs through `codecs`
    pub fn new(catalog: &'a SchemaCatalog, codecs: &'a CodecRegistry) -> Self {
        MetadataBuilder {
            catalog,
            codecs,
            factory: Arc::new(BlankObjectFactory),
            limits: Limits::default(),
            auto_vivify: true,
        }
    }

    /// Factory for blank intermediate objects
    pub fn instance_factory(mut self, factory: Arc<dyn InstanceFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Limits used for name validation
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Whether accessors create missing intermediate objects
    pub fn auto_vivify(mut self, enabled: bool) -> Self {
        self.auto_vivify = enabled;
        self
    }

    /// Build metadata for `type_name` in its declared domain
    pub fn build(&self, type_name: &str) -> Result<DomainMetadata> {
        let domain = self.catalog.get(type_name)?.domain_name().to_string();
        self.build_for(type_name, &domain, &PropertyPath::root())
    }

    /// Build metadata for `type_name` in `domain`, rooted at `parent`
    pub fn build_for(
        &self,
        type_name: &str,
        domain: &str,
        parent: &PropertyPath,
    ) -> Result<DomainMetadata> {
        validate_name_with_limits(domain, &self.limits).map_err(|reason| {
            ConfigurationError::InvalidName {
                type_name: type_name.to_string(),
                name: domain.to_string(),
                reason,
            }
        })?;
        let schema = self.catalog.get(type_name)?;
        let intermediates = vec![None; parent.len()];
        let stack = vec![type_name.to_string()];

        let metadata = self.build_type(
            schema,
            domain,
            Level {
                path: parent,
                intermediates: &intermediates,
                stack: &stack,
            },
        )?;
        tracing::info!(
            type_name = %type_name,
            domain = %domain,
            attributes = metadata.store().len(),
            "built domain metadata"
        );
        Ok(metadata)
    }

    fn build_type(&self, schema: &DomainSchema, domain: &str, level: Level<'_>) -> Result<DomainMetadata> {
        let top_level = level.stack.len() == 1;
        let mut store = AttributeStore::new();
        let mut identifier: Option<Arc<AttributeDescriptor>> = None;

        for prop in &schema.properties {
            if prop.name == CLASS_PROPERTY || prop.role == PropertyRole::Transient {
                tracing::trace!(type_name = %schema.name, property = %prop.name, "skipping property");
                continue;
            }
            validate_name_with_limits(&prop.name, &self.limits).map_err(|reason| {
                ConfigurationError::InvalidName {
                    type_name: schema.name.clone(),
                    name: prop.name.clone(),
                    reason,
                }
            })?;
            let path = level.path.child(&prop.name);

            if prop.role == PropertyRole::Flattened {
                let nested = self.flatten(schema, prop, domain, &path, &level)?;
                tracing::debug!(
                    type_name = %schema.name,
                    property = %prop.name,
                    nested = %nested.type_name(),
                    attributes = nested.store().len(),
                    "merging flattened attributes"
                );
                store.merge(nested.store())?;
                continue;
            }

            let descriptor = self.describe(schema, prop, path, level.intermediates)?;
            if prop.role == PropertyRole::Identifier {
                if descriptor.value_type() != &ValueType::String
                    || descriptor.container() != ContainerType::Scalar
                {
                    return Err(ConfigurationError::IdentifierNotString {
                        type_name: schema.name.clone(),
                        property: prop.name.clone(),
                        found: descriptor.value_type().clone(),
                    }
                    .into());
                }
                if top_level {
                    if let Some(first) = &identifier {
                        return Err(ConfigurationError::DuplicateIdentifier {
                            type_name: schema.name.clone(),
                            first: first.name().to_string(),
                            second: prop.name.clone(),
                        }
                        .into());
                    }
                    identifier = Some(Arc::new(descriptor));
                    continue;
                }
                // Only the root type names the item; nested identifiers are plain attributes.
            }
            store.insert(descriptor)?;
        }

        Ok(DomainMetadata::new(
            schema.name.clone(),
            domain,
            level.path.clone(),
            identifier,
            store,
        ))
    }

    fn flatten(
        &self,
        schema: &DomainSchema,
        prop: &PropertySchema,
        domain: &str,
        path: &PropertyPath,
        level: &Level<'_>,
    ) -> Result<DomainMetadata> {
        let nested_type = match &prop.shape {
            PropertyShape::Object(t) => t,
            other => {
                return Err(ConfigurationError::Introspection {
                    type_name: schema.name.clone(),
                    reason: format!(
                        "flattened property '{}' is a {}, not an object",
                        prop.name,
                        other.name()
                    ),
                }
                .into())
            }
        };
        if level.stack.iter().any(|t| t == nested_type) {
            return Err(ConfigurationError::FlattenCycle {
                path: format!("{} -> {}", level.stack.join(" -> "), nested_type),
            }
            .into());
        }
        let nested_schema = self.catalog.get(nested_type)?;

        let mut intermediates = level.intermediates.to_vec();
        intermediates.push(Some(nested_type.clone()));

        let mut stack = level.stack.to_vec();
        stack.push(nested_type.clone());
        self.build_type(
            nested_schema,
            domain,
            Level {
                path,
                intermediates: &intermediates,
                stack: &stack,
            },
        )
    }

    fn describe(
        &self,
        schema: &DomainSchema,
        prop: &PropertySchema,
        path: PropertyPath,
        intermediates: &[Option<String>],
    ) -> Result<AttributeDescriptor> {
        let (value_type, container) = self.types_of(schema, prop)?;
        let codec = self.codec_for(schema, prop, &value_type)?;

        let accessor = if self.auto_vivify {
            Accessor::new(path).with_vivify(Arc::clone(&self.factory), intermediates.to_vec())
        } else {
            Accessor::new(path)
        };

        let id_property = match &value_type {
            ValueType::Reference(target) => self
                .catalog
                .get(target)
                .ok()
                .and_then(|t| t.identifier())
                .map(|p| p.name.clone()),
            _ => None,
        };

        let mut descriptor = AttributeDescriptor::new(
            AttributeKey::new(prop.name.clone(), value_type, container),
            codec,
            accessor,
            schema.name.clone(),
        );
        if let Some(id_property) = id_property {
            descriptor = descriptor.with_id_property(id_property);
        }
        Ok(descriptor)
    }

    fn types_of(
        &self,
        schema: &DomainSchema,
        prop: &PropertySchema,
    ) -> std::result::Result<(ValueType, ContainerType), ConfigurationError> {
        let (declared, container) = match &prop.shape {
            PropertyShape::Scalar(vt) => (vt.clone(), ContainerType::Scalar),
            PropertyShape::Collection | PropertyShape::Array => match &prop.container {
                Some(element) => (element.value_type.clone(), element.container),
                None => {
                    return Err(ConfigurationError::MissingContainerMetadata {
                        type_name: schema.name.clone(),
                        property: prop.name.clone(),
                        shape: prop.shape.name(),
                    })
                }
            },
            PropertyShape::Object(t) => (ValueType::Reference(t.clone()), ContainerType::Scalar),
        };
        let value_type = match &prop.encoding {
            Encoding::ForwardReference { target } => ValueType::Reference(target.clone()),
            _ => declared,
        };
        Ok((value_type, container))
    }

    fn codec_for(
        &self,
        schema: &DomainSchema,
        prop: &PropertySchema,
        value_type: &ValueType,
    ) -> std::result::Result<Arc<dyn ValueCodec>, ConfigurationError> {
        let incompatible = || ConfigurationError::IncompatibleEncoding {
            type_name: schema.name.clone(),
            property: prop.name.clone(),
            encoding: prop.encoding.name(),
            value_type: value_type.clone(),
        };

        match &prop.encoding {
            Encoding::Default => match value_type {
                ValueType::Enum(name) => self.enum_codec(schema, prop, name),
                ValueType::Reference(target) => self.reference_codec(target),
                other => Ok(default_codec_for(other)),
            },
            Encoding::NumericPadded { digits, offset } => {
                if !value_type.is_integral() || !IntegerCodec::fits_layout(*digits, *offset) {
                    return Err(incompatible());
                }
                Ok(Arc::new(IntegerCodec::new(value_type.clone(), *digits, *offset)))
            }
            Encoding::NumericFloat {
                left,
                right,
                offset,
            } => {
                if value_type != &ValueType::Float
                    || !FloatCodec::fits_layout(*left, *right, *offset)
                {
                    return Err(incompatible());
                }
                Ok(Arc::new(FloatCodec::new(*left, *right, *offset)))
            }
            Encoding::Enum => match value_type {
                ValueType::Enum(name) => self.enum_codec(schema, prop, name),
                _ => Err(incompatible()),
            },
            Encoding::Custom { codec } => self
                .codecs
                .get(
                    codec,
                    CodecContext {
                        value_type,
                        variants: &prop.variants,
                    },
                )
                .ok_or_else(|| ConfigurationError::UnknownCodec {
                    type_name: schema.name.clone(),
                    property: prop.name.clone(),
                    codec: codec.clone(),
                }),
            Encoding::ForwardReference { target } => self.reference_codec(target),
        }
    }

    fn enum_codec(
        &self,
        schema: &DomainSchema,
        prop: &PropertySchema,
        enum_type: &str,
    ) -> std::result::Result<Arc<dyn ValueCodec>, ConfigurationError> {
        if prop.variants.is_empty() {
            return Err(ConfigurationError::Introspection {
                type_name: schema.name.clone(),
                reason: format!("enum property '{}' declares no variants", prop.name),
            });
        }
        Ok(Arc::new(EnumCodec::new(enum_type, prop.variants.clone())))
    }

    fn reference_codec(
        &self,
        target: &str,
    ) -> std::result::Result<Arc<dyn ValueCodec>, ConfigurationError> {
        let target_schema = self.catalog.get(target)?;
        Ok(Arc::new(ReferenceCodec::new(
            target,
            target_schema.domain_name(),
        )))
    }
}

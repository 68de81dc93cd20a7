//! Explicit schema descriptions
//!
//! A [`DomainSchema`] lists the properties of one structural type in
//! declaration order, with everything the metadata builder needs to know
//! about each of them: its shape, its role, and how its values are encoded.
//! Schemas are built in code or loaded from TOML into a [`SchemaCatalog`].
//!
//! ```toml
//! [[types]]
//! name = "Person"
//! domain = "people"
//!
//! [[types.properties]]
//! name = "id"
//! type = "string"
//! role = "identifier"
//!
//! [[types.properties]]
//! name = "age"
//! type = "int"
//! encoding = { kind = "numeric_padded", digits = 3 }
//!
//! [[types.properties]]
//! name = "tags"
//! shape = "collection"
//! container = { value_type = "string", container = "set" }
//!
//! [[types.properties]]
//! name = "address"
//! object = "Address"
//! role = "flattened"
//! ```

use std::path::Path;

use domainmap_core::{ConfigurationError, ContainerType, Error, Result, ValueType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Name of the universal type pseudo-property, never mapped
pub const CLASS_PROPERTY: &str = "class";

/// How a property's values are encoded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encoding {
    /// Type-based default codec
    #[default]
    Default,
    /// Zero-padded integer, shifted by `offset`
    NumericPadded {
        /// Width in digits
        digits: usize,
        /// Shift applied before padding
        #[serde(default)]
        offset: i64,
    },
    /// Fixed-point float with `left` integer and `right` fractional digits
    NumericFloat {
        /// Integer digit width
        left: usize,
        /// Fractional digit width
        right: usize,
        /// Shift applied before padding, in integer units
        #[serde(default)]
        offset: i64,
    },
    /// Enum stored by constant name
    Enum,
    /// Codec registered under an id
    Custom {
        /// Registry id
        codec: String,
    },
    /// Identifier of an object in another mapped domain
    ForwardReference {
        /// Structural type of the referenced object
        target: String,
    },
}

impl Encoding {
    /// Padded integer encoding
    pub fn padded(digits: usize, offset: i64) -> Self {
        Encoding::NumericPadded { digits, offset }
    }

    /// Fixed-point float encoding
    pub fn float(left: usize, right: usize, offset: i64) -> Self {
        Encoding::NumericFloat {
            left,
            right,
            offset,
        }
    }

    /// Custom codec encoding
    pub fn custom(codec: impl Into<String>) -> Self {
        Encoding::Custom {
            codec: codec.into(),
        }
    }

    /// Directive name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Default => "default",
            Encoding::NumericPadded { .. } => "numeric_padded",
            Encoding::NumericFloat { .. } => "numeric_float",
            Encoding::Enum => "enum",
            Encoding::Custom { .. } => "custom",
            Encoding::ForwardReference { .. } => "forward_reference",
        }
    }
}

/// What a property holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyShape {
    /// A single value of a recognized scalar type
    Scalar(ValueType),
    /// A collection; element metadata comes from the container descriptor
    Collection,
    /// An array; element metadata comes from the container descriptor
    Array,
    /// An object of another structural type
    Object(String),
}

impl PropertyShape {
    /// Shape name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            PropertyShape::Scalar(_) => "scalar",
            PropertyShape::Collection => "collection",
            PropertyShape::Array => "array",
            PropertyShape::Object(_) => "object",
        }
    }
}

/// Element metadata of a collection or array property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Element value type
    pub value_type: ValueType,
    /// Container kind
    pub container: ContainerType,
}

impl ContainerSpec {
    /// Create a container descriptor
    pub fn new(value_type: ValueType, container: ContainerType) -> Self {
        ContainerSpec {
            value_type,
            container,
        }
    }
}

/// Part a property plays in the mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyRole {
    /// Ordinary attribute
    #[default]
    Attribute,
    /// Item name of the object
    Identifier,
    /// Nested object whose attributes merge into the owner's
    Flattened,
    /// Not persisted
    Transient,
}

/// One declared property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProperty", into = "RawProperty")]
pub struct PropertySchema {
    /// Property name; also the attribute name
    pub name: String,
    /// Declared shape
    pub shape: PropertyShape,
    /// Element metadata for collections and arrays
    pub container: Option<ContainerSpec>,
    /// Role in the mapping
    pub role: PropertyRole,
    /// Encoding directive
    pub encoding: Encoding,
    /// Enum constant names, for enum-typed properties
    pub variants: Vec<String>,
}

impl PropertySchema {
    fn with_shape(name: impl Into<String>, shape: PropertyShape) -> Self {
        PropertySchema {
            name: name.into(),
            shape,
            container: None,
            role: PropertyRole::Attribute,
            encoding: Encoding::Default,
            variants: Vec::new(),
        }
    }

    /// Scalar property
    pub fn scalar(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::with_shape(name, PropertyShape::Scalar(value_type))
    }

    /// String identifier property
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::scalar(name, ValueType::String).role(PropertyRole::Identifier)
    }

    /// Enum property with its constant names
    pub fn enumeration<I, S>(name: impl Into<String>, enum_type: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scalar(name, ValueType::Enum(enum_type.into())).variants(variants)
    }

    /// Collection property; needs [`container`](Self::container) metadata
    pub fn collection(name: impl Into<String>) -> Self {
        Self::with_shape(name, PropertyShape::Collection)
    }

    /// Array property; needs [`container`](Self::container) metadata
    pub fn array(name: impl Into<String>) -> Self {
        Self::with_shape(name, PropertyShape::Array)
    }

    /// Object property of a mapped type
    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::with_shape(name, PropertyShape::Object(type_name.into()))
    }

    /// Flattened object property
    pub fn flattened(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::object(name, type_name).role(PropertyRole::Flattened)
    }

    /// Forward reference to an object of `target`
    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        Self::object(name, target.clone()).encoding(Encoding::ForwardReference { target })
    }

    /// Set the role
    pub fn role(mut self, role: PropertyRole) -> Self {
        self.role = role;
        self
    }

    /// Mark as transient
    pub fn transient(self) -> Self {
        self.role(PropertyRole::Transient)
    }

    /// Set the encoding directive
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set container metadata
    pub fn container(mut self, value_type: ValueType, container: ContainerType) -> Self {
        self.container = Some(ContainerSpec::new(value_type, container));
        self
    }

    /// Set enum constant names
    pub fn variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }
}

/// Shape keyword in TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ShapeKind {
    Scalar,
    Collection,
    Array,
    Object,
}

/// Flat on-disk form of [`PropertySchema`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawProperty {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape: Option<ShapeKind>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    container: Option<ContainerSpec>,
    #[serde(default)]
    role: PropertyRole,
    #[serde(default)]
    encoding: Encoding,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    variants: Vec<String>,
}

impl TryFrom<RawProperty> for PropertySchema {
    type Error = String;

    fn try_from(raw: RawProperty) -> std::result::Result<Self, Self::Error> {
        let kind = match (raw.shape, &raw.object, &raw.value_type) {
            (Some(kind), _, _) => kind,
            (None, Some(_), _) => ShapeKind::Object,
            (None, None, _) => ShapeKind::Scalar,
        };
        let shape = match kind {
            ShapeKind::Scalar => match raw.value_type {
                Some(vt) => PropertyShape::Scalar(vt),
                None => return Err(format!("property '{}' declares no type", raw.name)),
            },
            ShapeKind::Collection => PropertyShape::Collection,
            ShapeKind::Array => PropertyShape::Array,
            ShapeKind::Object => match raw.object {
                Some(t) => PropertyShape::Object(t),
                None => return Err(format!("object property '{}' declares no object type", raw.name)),
            },
        };
        Ok(PropertySchema {
            name: raw.name,
            shape,
            container: raw.container,
            role: raw.role,
            encoding: raw.encoding,
            variants: raw.variants,
        })
    }
}

impl From<PropertySchema> for RawProperty {
    fn from(p: PropertySchema) -> Self {
        let (shape, value_type, object) = match p.shape {
            PropertyShape::Scalar(vt) => (None, Some(vt), None),
            PropertyShape::Collection => (Some(ShapeKind::Collection), None, None),
            PropertyShape::Array => (Some(ShapeKind::Array), None, None),
            PropertyShape::Object(t) => (None, None, Some(t)),
        };
        RawProperty {
            name: p.name,
            shape,
            value_type,
            object,
            container: p.container,
            role: p.role,
            encoding: p.encoding,
            variants: p.variants,
        }
    }
}

/// Declared properties of one structural type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSchema {
    /// Structural type name
    pub name: String,
    /// Domain the type is stored in; defaults to the type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Properties in declaration order
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
}

impl DomainSchema {
    /// Schema with no properties
    pub fn new(name: impl Into<String>) -> Self {
        DomainSchema {
            name: name.into(),
            domain: None,
            properties: Vec::new(),
        }
    }

    /// Set the domain name
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Append a property
    pub fn property(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    /// Domain name, falling back to the type name
    pub fn domain_name(&self) -> &str {
        self.domain.as_deref().unwrap_or(&self.name)
    }

    /// The identifier property, if any
    pub fn identifier(&self) -> Option<&PropertySchema> {
        self.properties
            .iter()
            .find(|p| p.role == PropertyRole::Identifier)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    types: Vec<DomainSchema>,
}

/// Schemas by structural type name
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: FxHashMap<String, DomainSchema>,
    order: Vec<String>,
}

impl SchemaCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema
    ///
    /// # Errors
    ///
    /// Fails if a schema with the same type name is already registered.
    pub fn register(&mut self, schema: DomainSchema) -> Result<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(ConfigurationError::Introspection {
                type_name: schema.name.clone(),
                reason: "type declared twice".to_string(),
            }
            .into());
        }
        self.order.push(schema.name.clone());
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, schema: DomainSchema) -> Result<Self> {
        self.register(schema)?;
        Ok(self)
    }

    /// Look up a schema
    pub fn get(&self, type_name: &str) -> std::result::Result<&DomainSchema, ConfigurationError> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| ConfigurationError::UnknownType(type_name.to_string()))
    }

    /// Whether `type_name` is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Schemas in registration order
    pub fn schemas(&self) -> impl Iterator<Item = &DomainSchema> {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Parse `[[types]]` tables and register them
    pub fn load_toml_str(&mut self, content: &str) -> Result<()> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid schema: {}", e)))?;
        for schema in file.types {
            self.register(schema)?;
        }
        Ok(())
    }

    /// Read a schema file and register its types
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "cannot read schema file '{}': {}",
                path.display(),
                e
            ))
        })?;
        self.load_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })?;
        tracing::debug!(path = %path.display(), types = self.len(), "loaded schema file");
        Ok(())
    }

    /// Serialize the catalog as `[[types]]` tables
    pub fn to_toml_string(&self) -> Result<String> {
        let file = CatalogFile {
            types: self.schemas().cloned().collect(),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| Error::Serialization(format!("cannot encode schema: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEOPLE: &str = r#"
[[types]]
name = "Person"
domain = "people"

[[types.properties]]
name = "id"
type = "string"
role = "identifier"

[[types.properties]]
name = "age"
type = "int"
encoding = { kind = "numeric_padded", digits = 3 }

[[types.properties]]
name = "color"
type = { enum = "Color" }
variants = ["RED", "GREEN"]

[[types.properties]]
name = "tags"
shape = "collection"
container = { value_type = "string", container = "set" }

[[types.properties]]
name = "address"
object = "Address"
role = "flattened"

[[types]]
name = "Address"

[[types.properties]]
name = "city"
type = "string"
"#;

    #[test]
    fn test_load_toml() {
        let mut catalog = SchemaCatalog::new();
        catalog.load_toml_str(PEOPLE).unwrap();
        assert_eq!(catalog.len(), 2);

        let person = catalog.get("Person").unwrap();
        assert_eq!(person.domain_name(), "people");
        assert_eq!(person.identifier().map(|p| p.name.as_str()), Some("id"));
        assert_eq!(person.properties[1].encoding, Encoding::padded(3, 0));
        assert_eq!(
            person.properties[2].shape,
            PropertyShape::Scalar(ValueType::Enum("Color".into()))
        );
        assert_eq!(
            person.properties[3].container,
            Some(ContainerSpec::new(ValueType::String, ContainerType::Set))
        );
        assert_eq!(
            person.properties[4].shape,
            PropertyShape::Object("Address".into())
        );
        assert_eq!(person.properties[4].role, PropertyRole::Flattened);

        let address = catalog.get("Address").unwrap();
        assert_eq!(address.domain_name(), "Address");
    }

    #[test]
    fn test_scalar_without_type_is_rejected() {
        let err = SchemaCatalog::new()
            .load_toml_str("[[types]]\nname = \"A\"\n[[types.properties]]\nname = \"x\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("declares no type"));
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let result = SchemaCatalog::new()
            .with(DomainSchema::new("A"))
            .and_then(|c| c.with(DomainSchema::new("A")));
        assert!(result.unwrap_err().is_configuration());
    }

    #[test]
    fn test_unknown_type() {
        let err = SchemaCatalog::new().get("Ghost").unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownType("Ghost".into()));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut catalog = SchemaCatalog::new();
        catalog.load_toml_str(PEOPLE).unwrap();
        let text = catalog.to_toml_string().unwrap();

        let mut reloaded = SchemaCatalog::new();
        reloaded.load_toml_str(&text).unwrap();
        assert_eq!(reloaded.get("Person").unwrap(), catalog.get("Person").unwrap());
        assert_eq!(reloaded.get("Address").unwrap(), catalog.get("Address").unwrap());
    }

    #[test]
    fn test_builder_helpers() {
        let schema = DomainSchema::new("Order")
            .domain("orders")
            .property(PropertySchema::identifier("id"))
            .property(PropertySchema::reference("owner", "User"))
            .property(PropertySchema::scalar("note", ValueType::String).transient());
        assert_eq!(schema.properties.len(), 3);
        assert_eq!(
            schema.properties[1].encoding,
            Encoding::ForwardReference {
                target: "User".into()
            }
        );
        assert_eq!(schema.properties[2].role, PropertyRole::Transient);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        std::fs::write(&path, PEOPLE).unwrap();
        let mut catalog = SchemaCatalog::new();
        catalog.load_file(&path).unwrap();
        assert!(catalog.contains("Address"));
    }
}

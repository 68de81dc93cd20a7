//! Mapper configuration via `domainmap.toml`
//!
//! One small file controls the knobs that are not part of a schema: the
//! default read consistency and result limit for new selects, how query
//! attributes missing from metadata are treated, whether accessors create
//! missing intermediate objects, which schema files to load and the store
//! limits. A missing key falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::limits::Limits;

/// Config file name looked up next to the application's working directory.
pub const CONFIG_FILE_NAME: &str = "domainmap.toml";

/// Mapper configuration loaded from `domainmap.toml`.
///
/// # Example
///
/// ```toml
/// consistent_read = false
/// strict_attributes = false
/// auto_vivify = true
/// schema_files = ["schema/people.toml"]
///
/// [limits]
/// max_select_limit = 2500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Default consistent-read flag for new selects.
    #[serde(default)]
    pub consistent_read: bool,
    /// Limit applied to selects that set none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u32>,
    /// Reject query attributes missing from metadata instead of falling back
    /// to unordered natural-string encoding.
    #[serde(default)]
    pub strict_attributes: bool,
    /// Create missing intermediate objects when writing nested attributes.
    #[serde(default = "default_auto_vivify")]
    pub auto_vivify: bool,
    /// Schema files loaded into the schema catalog, relative to the config file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_files: Vec<PathBuf>,
    /// Store limits.
    #[serde(default)]
    pub limits: Limits,
}

fn default_auto_vivify() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            consistent_read: false,
            default_limit: None,
            strict_attributes: false,
            auto_vivify: default_auto_vivify(),
            schema_files: Vec::new(),
            limits: Limits::default(),
        }
    }
}

impl MapperConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if `default_limit` lies outside `1..=limits.max_select_limit`.
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.default_limit {
            self.limits.validate_select_limit(limit)?;
        }
        Ok(())
    }

    /// Commented `domainmap.toml` written by [`MapperConfig::write_default_if_missing`].
    pub fn default_toml() -> &'static str {
        r#"# domainmap configuration
#
# Consistent read: default flag for new selects (default: false).
# Passed through to the transport untouched.
consistent_read = false

# Limit applied to selects that set none (1..=max_select_limit).
# default_limit = 100

# Strict attributes: reject query attributes missing from metadata.
# When false (default) they render with unordered natural-string encoding.
strict_attributes = false

# Auto-vivify: create missing intermediate objects when writing
# nested (flattened) attributes (default: true).
auto_vivify = true

# Schema files loaded into the schema catalog, relative to this file.
# schema_files = ["schema.toml"]

# Store limits.
# [limits]
# max_name_bytes = 1024
# max_value_bytes = 1024
# max_attributes_per_item = 256
# max_select_limit = 2500
# max_in_values = 20
"#
    }

    /// Load a config from a TOML file.
    ///
    /// Relative `schema_files` entries are resolved against the file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "cannot read mapper config '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut config: MapperConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "invalid mapper config '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;

        if let Some(base) = path.parent() {
            for file in &mut config.schema_files {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
        tracing::debug!(path = %path.display(), "loaded mapper config");
        Ok(config)
    }

    /// Create `path` with the default content unless something is already there.
    ///
    /// An existing file is left untouched.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "cannot create mapper config '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Save this config as TOML, replacing `path`.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("cannot encode mapper config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "cannot write mapper config '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = MapperConfig::default();
        assert!(!config.consistent_read);
        assert!(config.auto_vivify);
        assert!(!config.strict_attributes);
        assert_eq!(config.default_limit, None);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn test_default_file_is_valid() {
        let config: MapperConfig = toml::from_str(MapperConfig::default_toml()).unwrap();
        assert_eq!(config, MapperConfig::default());
    }

    #[test]
    fn parse_partial_limits_table() {
        let config: MapperConfig = toml::from_str(
            r#"
consistent_read = true

[limits]
max_select_limit = 50
"#,
        )
        .unwrap();
        assert!(config.consistent_read);
        assert_eq!(config.limits.max_select_limit, 50);
        assert_eq!(config.limits.max_in_values, 20);
    }

    #[test]
    fn default_limit_above_max_is_rejected() {
        let config: MapperConfig = toml::from_str(
            r#"
default_limit = 100

[limits]
max_select_limit = 50
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.reason_code(), "select_limit_out_of_range");
    }

    #[test]
    fn test_open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(!path.exists());

        MapperConfig::write_default_if_missing(&path).unwrap();
        assert!(path.exists());

        let config = MapperConfig::from_file(&path).unwrap();
        assert!(config.auto_vivify);
    }

    #[test]
    fn test_existing_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, "strict_attributes = true\n").unwrap();
        MapperConfig::write_default_if_missing(&path).unwrap();

        let config = MapperConfig::from_file(&path).unwrap();
        assert!(config.strict_attributes);
    }

    #[test]
    fn from_file_resolves_schema_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "schema_files = [\"people.toml\"]\n").unwrap();

        let config = MapperConfig::from_file(&path).unwrap();
        assert_eq!(config.schema_files, vec![dir.path().join("people.toml")]);
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = MapperConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "auto_vivify = \"sometimes\"\n").unwrap();
        assert!(MapperConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let config = MapperConfig {
            consistent_read: true,
            default_limit: Some(10),
            strict_attributes: true,
            auto_vivify: false,
            schema_files: Vec::new(),
            limits: Limits::with_small_limits(),
        };

        config.write_to_file(&path).unwrap();
        let loaded = MapperConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}

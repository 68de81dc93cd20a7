//! Config Files
//!
//! `domainmap.toml` next to TOML schema files, loaded through
//! `Mapper::open`.

use std::fs;

use crate::common::init_tracing;
use domainmap::{condition, greater_than, Mapper, MapperConfig, Select, CONFIG_FILE_NAME};
use serde_json::json;
use tempfile::TempDir;

const SCHEMA: &str = r#"
[[types]]
name = "Sensor"
domain = "sensors"

[[types.properties]]
name = "id"
type = "string"
role = "identifier"

[[types.properties]]
name = "reading"
type = "long"
encoding = { kind = "numeric_padded", digits = 6, offset = 100000 }
"#;

#[test]
fn test_open_writes_default_config() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let mapper = Mapper::open(dir.path()).unwrap();

    assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    assert_eq!(mapper.config(), &MapperConfig::default());
    assert!(mapper.catalog().is_empty());
}

#[test]
fn test_open_loads_schema_files() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("schema")).unwrap();
    fs::write(dir.path().join("schema/sensors.toml"), SCHEMA).unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "consistent_read = true\ndefault_limit = 50\nschema_files = [\"schema/sensors.toml\"]\n",
    )
    .unwrap();

    let mapper = Mapper::open(dir.path()).unwrap();
    assert!(mapper.catalog().contains("Sensor"));

    let item = mapper
        .to_item("Sensor", &json!({"id": "s-1", "reading": -42}))
        .unwrap();
    assert_eq!(item.first("reading"), Some("099958"));

    let q = mapper
        .render(
            "Sensor",
            &Select::all().filter(condition("reading", greater_than(-100))),
        )
        .unwrap();
    assert_eq!(
        q.text,
        "select * from `sensors` where `reading` > '099900' limit 50"
    );
    assert!(q.consistent_read);
}

#[test]
fn test_invalid_default_limit_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "default_limit = 0\n").unwrap();
    let err = Mapper::open(dir.path()).unwrap_err();
    assert_eq!(err.reason_code(), "select_limit_out_of_range");
}

#[test]
fn test_missing_schema_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "schema_files = [\"nope.toml\"]\n",
    )
    .unwrap();
    assert!(Mapper::open(dir.path()).is_err());
}

#[test]
fn test_config_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let config = MapperConfig {
        strict_attributes: true,
        default_limit: Some(10),
        ..MapperConfig::default()
    };
    config.write_to_file(&path).unwrap();

    let mapper = Mapper::open(dir.path()).unwrap();
    assert!(mapper.config().strict_attributes);
    assert_eq!(mapper.config().default_limit, Some(10));
}

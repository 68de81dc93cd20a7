//! Flattening
//!
//! Flattened sub-objects contribute their attributes to the owner's
//! namespace. Name collisions, cycles and undeclared container types are
//! configuration errors reported when metadata is built.

use crate::common::*;
use domainmap::schema::{DomainSchema, PropertySchema, SchemaCatalog};
use domainmap::{ConfigurationError, ContainerType, Error, Mapper, MapperConfig, ValueType};
use serde_json::json;

#[test]
fn test_flattened_attributes_are_merged() {
    let mapper = mapper();
    let metadata = mapper.metadata("Person").unwrap();

    assert!(metadata.is_attribute_defined("city"));
    assert!(metadata.is_attribute_defined("street"));
    assert_eq!(
        metadata.attribute("zip").unwrap().declaring_type(),
        "Address"
    );
    assert_eq!(
        metadata.attribute("zip").unwrap().path().to_string(),
        "address.zip"
    );
    assert!(!metadata.is_attribute_defined("address"));
    assert_eq!(metadata.identifier_attribute().unwrap().name(), "id");
}

#[test]
fn test_name_collision_names_both_types() {
    let catalog = SchemaCatalog::new()
        .with(
            DomainSchema::new("Owner")
                .property(PropertySchema::identifier("id"))
                .property(PropertySchema::scalar("name", ValueType::String))
                .property(PropertySchema::flattened("pet", "Animal")),
        )
        .and_then(|c| {
            c.with(DomainSchema::new("Animal").property(PropertySchema::scalar("name", ValueType::String)))
        })
        .unwrap();
    let mapper = Mapper::new(catalog);

    match mapper.metadata("Owner") {
        Err(Error::Configuration(ConfigurationError::DuplicateAttribute {
            attribute,
            existing_type,
            incoming_type,
        })) => {
            assert_eq!(attribute, "name");
            assert_eq!(existing_type, "Owner");
            assert_eq!(incoming_type, "Animal");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_flatten_cycle_is_rejected() {
    let catalog = SchemaCatalog::new()
        .with(
            DomainSchema::new("Node")
                .property(PropertySchema::identifier("id"))
                .property(PropertySchema::flattened("next", "Link")),
        )
        .and_then(|c| c.with(DomainSchema::new("Link").property(PropertySchema::flattened("node", "Node"))))
        .unwrap();
    let err = Mapper::new(catalog).metadata("Node").unwrap_err();
    assert_eq!(err.reason_code(), "flatten_cycle");
}

#[test]
fn test_collection_without_container_metadata() {
    let catalog = SchemaCatalog::new()
        .with(
            DomainSchema::new("Bag")
                .property(PropertySchema::identifier("id"))
                .property(PropertySchema::collection("things")),
        )
        .unwrap();
    let err = Mapper::new(catalog).metadata("Bag").unwrap_err();
    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::MissingContainerMetadata { .. })
    ));
}

#[test]
fn test_nested_identifier_is_a_plain_attribute() {
    let catalog = SchemaCatalog::new()
        .with(
            DomainSchema::new("Order")
                .domain("orders")
                .property(PropertySchema::identifier("id"))
                .property(PropertySchema::flattened("customer", "Customer")),
        )
        .and_then(|c| {
            c.with(
                DomainSchema::new("Customer")
                    .property(PropertySchema::identifier("customer_id"))
                    .property(
                        PropertySchema::collection("emails")
                            .container(ValueType::String, ContainerType::List),
                    ),
            )
        })
        .unwrap();
    let mapper = Mapper::new(catalog);
    let metadata = mapper.metadata("Order").unwrap();
    assert_eq!(metadata.identifier_attribute().unwrap().name(), "id");
    assert!(metadata.is_attribute_defined("customer_id"));

    let record = json!({"id": "o-1", "customer": {"customer_id": "c-9", "emails": ["a@x", "b@x"]}});
    let item = mapper.to_item("Order", &record).unwrap();
    assert_eq!(item.name, "o-1");
    assert_eq!(item.first("customer_id"), Some("c-9"));

    let restored: serde_json::Value = mapper.from_item("Order", &item).unwrap();
    assert_eq!(restored, record);
}

#[test]
fn test_without_auto_vivify_nested_writes_fail() {
    let config = MapperConfig {
        auto_vivify: false,
        ..MapperConfig::default()
    };
    let mapper = Mapper::with_config(config, catalog()).unwrap();
    let item = mapper.to_item("Person", &alice()).unwrap();

    let err = mapper.from_item::<Person>("Person", &item).unwrap_err();
    assert_eq!(err.reason_code(), "path_error");
}

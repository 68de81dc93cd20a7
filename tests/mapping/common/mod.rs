//! Shared fixtures for the mapping suite.

#![allow(dead_code)]

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use domainmap::schema::{DomainSchema, Encoding, PropertySchema, SchemaCatalog};
use domainmap::{ContainerType, DeferredReference, Mapper, ValueType};
use serde::{Deserialize, Serialize};

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub balance: i64,
    pub score: f64,
    pub favorite: Color,
    pub born: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visits: Vec<i32>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub owner: Option<DeferredReference>,
}

pub fn person_schema() -> DomainSchema {
    DomainSchema::new("Person")
        .domain("people")
        .property(PropertySchema::identifier("id"))
        .property(PropertySchema::scalar("name", ValueType::String))
        .property(PropertySchema::scalar("age", ValueType::Int).encoding(Encoding::padded(3, 0)))
        .property(
            PropertySchema::scalar("balance", ValueType::Long)
                .encoding(Encoding::padded(10, 1_000_000_000)),
        )
        .property(
            PropertySchema::scalar("score", ValueType::Float).encoding(Encoding::float(4, 2, 1000)),
        )
        .property(PropertySchema::enumeration(
            "favorite",
            "Color",
            ["Red", "Green", "Blue"],
        ))
        .property(PropertySchema::scalar("born", ValueType::Timestamp))
        .property(
            PropertySchema::collection("tags").container(ValueType::String, ContainerType::Set),
        )
        .property(
            PropertySchema::array("visits")
                .container(ValueType::Int, ContainerType::List)
                .encoding(Encoding::padded(4, 0)),
        )
        .property(PropertySchema::flattened("address", "Address"))
}

pub fn address_schema() -> DomainSchema {
    DomainSchema::new("Address")
        .property(PropertySchema::scalar("street", ValueType::String))
        .property(PropertySchema::scalar("city", ValueType::String))
        .property(PropertySchema::scalar("zip", ValueType::Int).encoding(Encoding::padded(5, 0)))
}

pub fn pet_schema() -> DomainSchema {
    DomainSchema::new("Pet")
        .domain("pets")
        .property(PropertySchema::identifier("id"))
        .property(PropertySchema::scalar("name", ValueType::String))
        .property(PropertySchema::reference("owner", "Person"))
}

pub fn catalog() -> SchemaCatalog {
    SchemaCatalog::new()
        .with(person_schema())
        .and_then(|c| c.with(address_schema()))
        .and_then(|c| c.with(pet_schema()))
        .unwrap()
}

pub fn mapper() -> Mapper {
    init_tracing();
    Mapper::new(catalog())
}

pub fn alice() -> Person {
    Person {
        id: "p-1".into(),
        name: "Alice".into(),
        age: 34,
        balance: -250,
        score: 12.5,
        favorite: Color::Green,
        born: Utc.with_ymd_and_hms(1990, 4, 1, 8, 30, 0).unwrap(),
        tags: vec!["admin".into(), "ops".into()],
        visits: vec![3, 1, 2],
        address: Some(Address {
            street: "1 Main St".into(),
            city: "Springfield".into(),
            zip: Some(1234),
        }),
    }
}

//! Object Round Trips
//!
//! `to_item` followed by `from_item` restores the object, including
//! multi-valued, flattened, enum, timestamp and reference properties.

use crate::common::*;
use domainmap::{DeferredReference, Item, RestorePolicy};

#[test]
fn test_person_round_trip() {
    let mapper = mapper();
    let person = alice();
    let item = mapper.to_item("Person", &person).unwrap();

    assert_eq!(item.name, "p-1");
    assert_eq!(item.first("age"), Some("034"));
    assert_eq!(item.first("balance"), Some("0999999750"));
    assert_eq!(item.first("score"), Some("1012.50"));
    assert_eq!(item.first("favorite"), Some("Green"));
    assert_eq!(item.first("born"), Some("1990-04-01T08:30:00.000Z"));
    assert_eq!(item.values("tags").collect::<Vec<_>>(), vec!["admin", "ops"]);
    assert_eq!(item.values("visits").collect::<Vec<_>>(), vec!["0003", "0001", "0002"]);
    assert_eq!(item.first("city"), Some("Springfield"));
    assert_eq!(item.first("zip"), Some("01234"));
    assert!(item.first("id").is_none());

    let restored: Person = mapper.from_item("Person", &item).unwrap();
    assert_eq!(restored, person);
}

#[test]
fn test_sets_drop_duplicate_values() {
    let mapper = mapper();
    let mut person = alice();
    person.tags = vec!["a".into(), "b".into(), "a".into()];
    person.visits = vec![1, 1];
    let item = mapper.to_item("Person", &person).unwrap();
    assert_eq!(item.values("tags").count(), 2);
    assert_eq!(item.values("visits").count(), 2);
}

#[test]
fn test_absent_flattened_object_round_trips_as_none() {
    let mapper = mapper();
    let mut person = alice();
    person.address = None;
    let item = mapper.to_item("Person", &person).unwrap();
    assert!(item.first("city").is_none());

    let restored: Person = mapper.from_item("Person", &item).unwrap();
    assert_eq!(restored.address, None);
}

#[test]
fn test_missing_identifier_is_rejected() {
    let mapper = mapper();
    let mut person = alice();
    person.id = String::new();
    let err = mapper.to_item("Person", &person).unwrap_err();
    assert_eq!(err.reason_code(), "encode_failed");
}

#[test]
fn test_reference_round_trip() {
    let mapper = mapper();
    let pet = Pet {
        id: "rex".into(),
        name: "Rex".into(),
        owner: Some(DeferredReference::new("people", "Person", "p-1")),
    };
    let item = mapper.to_item("Pet", &pet).unwrap();
    assert_eq!(item.first("owner"), Some("p-1"));

    let restored: Pet = mapper.from_item("Pet", &item).unwrap();
    assert_eq!(restored, pet);

    let owner = restored.owner.unwrap();
    let query = mapper.dereference(&owner).unwrap();
    assert_eq!(query.text, "select * from `people` where itemName() = 'p-1'");
    assert!(query.unresolved.is_empty());
}

#[test]
fn test_corrupt_value_aborts_by_default() {
    let mapper = mapper();
    let mut item = mapper.to_item("Person", &alice()).unwrap();
    item.attributes.retain(|a| a.name != "age");
    item.push("age", "old");

    let err = mapper.from_item::<Person>("Person", &item).unwrap_err();
    assert_eq!(err.reason_code(), "restore_failed");
}

#[test]
fn test_corrupt_value_is_skipped_with_skip_policy() {
    let mapper = mapper().with_restore_policy(RestorePolicy::Skip);
    let mut item = mapper.to_item("Person", &alice()).unwrap();
    item.attributes.retain(|a| a.name != "zip");
    item.push("zip", "not-a-zip");

    let restored: Person = mapper.from_item("Person", &item).unwrap();
    assert_eq!(restored.address.unwrap().zip, None);
}

#[test]
fn test_unmapped_attributes_are_ignored() {
    let mapper = mapper();
    let item: Item = mapper
        .to_item("Person", &alice())
        .unwrap();
    let mut extended = item.clone();
    extended.push("legacy_flag", "1");

    let a: Person = mapper.from_item("Person", &item).unwrap();
    let b: Person = mapper.from_item("Person", &extended).unwrap();
    assert_eq!(a, b);
}

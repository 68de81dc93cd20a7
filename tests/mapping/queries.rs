//! Query Rendering
//!
//! Condition trees and selects rendered through the mapper, with and
//! without metadata.

use std::sync::Arc;
use std::thread;

use crate::common::*;
use domainmap::codec::{IntegerCodec, ValueCodec};
use domainmap::{
    between, condition, greater_equal, greater_than, group, is, is_in, is_not, is_null, less_equal,
    less_than, like, not, not_like, where_item_name, Direction, Error, Mapper, MapperConfig, Select,
    Value, ValueType,
};

#[test]
fn test_leaf_without_metadata() {
    assert_eq!(condition("age", is(5)).describe().unwrap(), "`age` = '5'");
}

#[test]
fn test_grouped_like_and_not_like() {
    let c = condition("first", like("a%"))
        .group()
        .and(("last", not_like("%z")));
    assert_eq!(
        c.describe().unwrap(),
        "(`first` like 'a%') and `last` not like '%z'"
    );
}

#[test]
fn test_nested_groups() {
    let c = condition("a", is(1))
        .and(("b", is_not(2)))
        .group()
        .or(condition("c", less_than(100))
            .and(("d", less_equal(200)))
            .group())
        .group();
    assert_eq!(
        c.describe().unwrap(),
        "((`a` = '1' and `b` != '2') or (`c` < '100' and `d` <= '200'))"
    );
}

#[test]
fn test_group_and_double_negation_laws() {
    let x = condition("a", is(1)).or(("b", greater_equal(2)));
    assert_eq!(
        group(x.clone()).describe().unwrap(),
        format!("({})", x.describe().unwrap())
    );
    assert_eq!(not(not(x.clone())).describe().unwrap(), x.describe().unwrap());
}

#[test]
fn test_typed_select_through_mapper() {
    let mapper = mapper();
    let select = Select::attributes(["name", "age"])
        .filter(
            condition("age", between(18).and(65))
                .and(("balance", less_than(0)))
                .and(("favorite", is_in([Value::Symbol("Red".into()), Value::Symbol("Blue".into())]))),
        )
        .order_by("age", Direction::Asc)
        .limit(100);
    let q = mapper.render("Person", &select).unwrap();
    assert_eq!(
        q.text,
        "select `name`, `age` from `people` where `age` between '018' and '065' \
         and `balance` < '1000000000' and `favorite` in ('Red', 'Blue') \
         order by `age` asc limit 100"
    );
    assert!(q.unresolved.is_empty());
    assert!(!q.consistent_read);
}

#[test]
fn test_flattened_and_multi_valued_attributes_resolve() {
    let mapper = mapper();
    let q = mapper
        .render(
            "Person",
            &Select::item_names().filter(
                condition("zip", greater_than(900))
                    .intersection(("visits", greater_than(10))),
            ),
        )
        .unwrap();
    assert_eq!(
        q.text,
        "select itemName() from `people` where `zip` > '00900' intersection `visits` > '0010'"
    );
}

#[test]
fn test_unknown_enum_symbol_fails() {
    let mapper = mapper();
    let err = mapper
        .render(
            "Person",
            &Select::all().filter(condition("favorite", is(Value::Symbol("Mauve".into())))),
        )
        .unwrap_err();
    assert_eq!(err.reason_code(), "encode_failed");
}

#[test]
fn test_explicit_codec_beats_metadata() {
    let mapper = mapper();
    let wide: Arc<dyn ValueCodec> = Arc::new(IntegerCodec::new(ValueType::Int, 6, 0));
    let q = mapper
        .render(
            "Person",
            &Select::count().filter(condition("age", is(5).with_codec(wide)).or(("age", is(5)))),
        )
        .unwrap();
    assert_eq!(
        q.text,
        "select count(*) from `people` where `age` = '000005' or `age` = '005'"
    );
}

#[test]
fn test_unresolved_attributes_fall_back_and_are_reported() {
    let mapper = mapper();
    let q = mapper
        .render(
            "Person",
            &Select::all().filter(condition("nickname", is_null()).or(("age", is(9)))),
        )
        .unwrap();
    assert_eq!(
        q.text,
        "select * from `people` where `nickname` is null or `age` = '009'"
    );
    assert_eq!(q.unresolved, vec!["nickname"]);
}

#[test]
fn test_strict_mapper_rejects_unknown_attributes() {
    let config = MapperConfig {
        strict_attributes: true,
        ..MapperConfig::default()
    };
    let mapper = Mapper::with_config(config, catalog()).unwrap();
    let err = mapper
        .render("Person", &Select::all().filter(condition("nickname", is("x"))))
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvedAttribute { .. }));
}

#[test]
fn test_incomplete_between_is_a_render_error() {
    let mapper = mapper();
    let err = mapper
        .render("Person", &Select::all().filter(condition("age", between(3))))
        .unwrap_err();
    assert_eq!(err.reason_code(), "incomplete_matcher");
}

#[test]
fn test_item_name_condition() {
    let mapper = mapper();
    let q = mapper
        .render(
            "Person",
            &mapper.select().filter(where_item_name(like("p-%"))),
        )
        .unwrap();
    assert_eq!(q.text, "select * from `people` where itemName() like 'p-%'");
}

#[test]
fn test_identifier_property_queries_item_name() {
    let mapper = mapper();
    let q = mapper
        .render("Person", &mapper.select().filter(condition("id", is("p-1"))))
        .unwrap();
    assert_eq!(q.text, "select * from `people` where itemName() = 'p-1'");
    assert!(q.unresolved.is_empty());
}

#[test]
fn test_shared_template_across_threads() {
    let mapper = mapper();
    let template = condition("age", greater_than(7)).and(("name", is("Bob")));

    let rendered: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    mapper
                        .render("Person", &Select::all().filter(template.clone()))
                        .unwrap()
                        .text
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for text in rendered {
        assert_eq!(
            text,
            "select * from `people` where `age` > '007' and `name` = 'Bob'"
        );
    }
    assert_eq!(template.describe().unwrap(), "`age` > '7' and `name` = 'Bob'");
}

//! Lexicographic Ordering
//!
//! Stored strings of padded/offset numeric attributes compare like the
//! numbers they encode, so range queries over the store's byte-wise
//! comparison return the right items.

use crate::common::*;
use domainmap::codec::{FloatCodec, IntegerCodec, ValueCodec};
use domainmap::{Value, ValueType};
use proptest::prelude::*;

fn stored(mapper: &domainmap::Mapper, person: &Person, attribute: &str) -> String {
    let item = mapper.to_item("Person", person).unwrap();
    item.first(attribute).unwrap().to_string()
}

#[test]
fn test_padding_and_offset_examples() {
    let padded = IntegerCodec::new(ValueType::Int, 3, 0);
    assert_eq!(padded.encode(&Value::Int(5)).unwrap(), "005");

    let offset = IntegerCodec::new(ValueType::Int, 4, 1000);
    assert_eq!(offset.encode(&Value::Int(-5)).unwrap(), "0995");
    assert_eq!(offset.decode("0995").unwrap(), Value::Int(-5));
}

#[test]
fn test_stored_balances_sort_numerically() {
    let mapper = mapper();
    let balances = [-1_000_000, -250, -1, 0, 7, 42, 1_000, 999_999_999];
    let encoded: Vec<String> = balances
        .iter()
        .map(|b| {
            let mut p = alice();
            p.balance = *b;
            stored(&mapper, &p, "balance")
        })
        .collect();

    let mut sorted = encoded.clone();
    sorted.sort();
    assert_eq!(sorted, encoded);
    assert!(encoded.iter().all(|s| s.len() == 10));
}

#[test]
fn test_stored_scores_sort_numerically() {
    let mapper = mapper();
    let scores = [-999.99, -10.5, -0.01, 0.0, 0.01, 9.99, 10.0, 1234.56];
    let encoded: Vec<String> = scores
        .iter()
        .map(|s| {
            let mut p = alice();
            p.score = *s;
            stored(&mapper, &p, "score")
        })
        .collect();

    let mut sorted = encoded.clone();
    sorted.sort();
    assert_eq!(sorted, encoded);
    assert_eq!(encoded[3], "1000.00");
}

#[test]
fn test_out_of_range_value_is_an_encode_error() {
    let mapper = mapper();
    let mut p = alice();
    p.age = 1000;
    let err = mapper.to_item("Person", &p).unwrap_err();
    assert_eq!(err.reason_code(), "encode_failed");
}

proptest! {
    #[test]
    fn prop_offset_integers_keep_order(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let codec = IntegerCodec::new(ValueType::Long, 8, 1_000_000);
        let ea = codec.encode(&Value::Long(a)).unwrap();
        let eb = codec.encode(&Value::Long(b)).unwrap();
        prop_assert_eq!(a.cmp(&b), ea.cmp(&eb));
        prop_assert_eq!(codec.decode(&ea).unwrap(), Value::Long(a));
    }

    #[test]
    fn prop_float_codec_keeps_order(a in -9999i64..9999, b in -9999i64..9999) {
        // Values with two decimals are exact under the fixed-point encoding.
        let (fa, fb) = (a as f64 / 100.0, b as f64 / 100.0);
        let codec = FloatCodec::new(3, 2, 100);
        let ea = codec.encode(&Value::Float(fa)).unwrap();
        let eb = codec.encode(&Value::Float(fb)).unwrap();
        prop_assert_eq!(a.cmp(&b), ea.cmp(&eb));
    }
}

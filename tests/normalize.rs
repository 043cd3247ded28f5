use std::str::FromStr;

use indexmap::IndexMap;
use proptest::prelude::*;
use rust_decimal::Decimal;

use tabload::normalize::{RawCell, RawRow, RealPolicy, ValueNormalizer};
use tabload::types::{Table, Value};
use tabload::LoadError;

fn dec(s: &str) -> Value {
    Value::Real(Decimal::from_str(s).unwrap())
}

fn headers(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn text_cells_are_typed() {
    let n = ValueNormalizer::new(RealPolicy::PreserveText);
    assert_eq!(n.normalize_cell("42".into()), Value::Integer(42));
    assert_eq!(n.normalize_cell("-7".into()), Value::Integer(-7));
    assert_eq!(n.normalize_cell("+5".into()), Value::Integer(5));
    assert_eq!(n.normalize_cell("007".into()), Value::Integer(7));
    assert_eq!(n.normalize_cell("2.1".into()), Value::Text("2.1".to_string()));
    assert_eq!(n.normalize_cell("abc".into()), Value::Text("abc".to_string()));
    assert_eq!(n.normalize_cell("".into()), Value::Text(String::new()));
    assert_eq!(n.normalize_cell(RawCell::Null), Value::Null);
}

#[test]
fn integers_out_of_range_fall_through_to_reals() {
    let text = "99999999999999999999";
    let preserve = ValueNormalizer::new(RealPolicy::PreserveText);
    assert_eq!(preserve.normalize_cell(text.into()), Value::Text(text.to_string()));

    let decimal = ValueNormalizer::new(RealPolicy::Decimal);
    assert_eq!(decimal.normalize_cell(text.into()), dec(text));
}

#[test]
fn decimal_policy_converts_reals() {
    let n = ValueNormalizer::new(RealPolicy::Decimal);
    assert_eq!(n.normalize_cell("2.1".into()), dec("2.1"));
    assert_eq!(n.normalize_cell(".5".into()), dec("0.5"));
    assert_eq!(n.normalize_cell("1e3".into()), dec("1000"));
    assert!(n.normalize_cell("NaN".into()).is_nan());
    assert_eq!(
        n.normalize_cell("-inf".into()),
        Value::Float(f64::NEG_INFINITY)
    );
}

#[test]
fn typed_cells_keep_their_type() {
    let n = ValueNormalizer::new(RealPolicy::PreserveText);
    assert_eq!(n.normalize_cell(RawCell::Int(3)), Value::Integer(3));
    assert_eq!(n.normalize_cell(RawCell::Float(2.5)), dec("2.5"));
    assert!(n.normalize_cell(RawCell::Float(f64::NAN)).is_nan());
    assert_eq!(
        n.normalize_cell(RawCell::Bool(true)),
        Value::Text("true".to_string())
    );
}

#[test]
fn strip_chars_apply_before_inference() {
    let n = ValueNormalizer::new(RealPolicy::PreserveText).with_strip_chars(" \"");
    assert_eq!(n.normalize_cell(" \"42\" ".into()), Value::Integer(42));
    assert_eq!(n.normalize_cell("  x ".into()), Value::Text("x".to_string()));
}

#[test]
fn sequence_rows_are_padded_and_truncated() {
    let n = ValueNormalizer::default();
    let h = headers(&["a", "b", "c"]);

    let short = n
        .normalize_row("t", 0, &h, RawRow::sequence(["1"]))
        .unwrap();
    assert_eq!(short, vec![Value::Integer(1), Value::Null, Value::Null]);

    let long = n
        .normalize_row("t", 1, &h, RawRow::sequence(["1", "2", "3", "4"]))
        .unwrap();
    assert_eq!(
        long,
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );
}

#[test]
fn mapping_and_record_rows_follow_headers() {
    let n = ValueNormalizer::default();
    let h = headers(&["a", "b"]);

    let mut map = IndexMap::new();
    map.insert("b".to_string(), RawCell::from("x"));
    map.insert("zzz".to_string(), RawCell::from("ignored"));
    let row = n.normalize_row("t", 0, &h, RawRow::Mapping(map)).unwrap();
    assert_eq!(row, vec![Value::Null, Value::Text("x".to_string())]);

    let row = n
        .normalize_row("t", 0, &h, RawRow::record([("b", "2"), ("a", "1")]))
        .unwrap();
    assert_eq!(row, vec![Value::Integer(1), Value::Integer(2)]);
}

#[test]
fn rows_without_headers_keep_their_own_order() {
    let n = ValueNormalizer::default();
    let row = n
        .normalize_row("t", 0, &[], RawRow::record([("b", "2"), ("a", "x")]))
        .unwrap();
    assert_eq!(row, vec![Value::Integer(2), Value::Text("x".to_string())]);
}

#[test]
fn scalar_rows_are_rejected_with_row_number() {
    let n = ValueNormalizer::default();
    let err = n
        .normalize_rows(
            "src",
            &headers(&["a"]),
            vec![RawRow::sequence(["1"]), RawRow::Scalar(RawCell::Int(5))],
        )
        .unwrap_err();
    match err {
        LoadError::InvalidData { source_id, message } => {
            assert_eq!(source_id, "src");
            assert!(message.contains("row 2"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tables_treat_nan_cells_as_equal() {
    let a = Table::new(
        "t",
        headers(&["x"]),
        vec![vec![Value::Float(f64::NAN)], vec![Value::Text("nan".to_string())]],
    );
    let b = Table::new(
        "t",
        headers(&["x"]),
        vec![vec![Value::Text("NaN".to_string())], vec![Value::Float(f64::NAN)]],
    );
    assert_eq!(a, b);

    let c = Table::new("t", headers(&["x"]), vec![vec![Value::Integer(1)], vec![Value::Null]]);
    assert_ne!(a, c);
}

proptest! {
    #[test]
    fn every_row_has_header_width(
        width in 1usize..8,
        cells in proptest::collection::vec("[a-z0-9.]{0,6}", 0..12),
    ) {
        let h: Vec<String> = (0..width).map(|i| format!("c{i}")).collect();
        let n = ValueNormalizer::new(RealPolicy::Decimal);
        let row = n.normalize_row("p", 0, &h, RawRow::sequence(cells)).unwrap();
        prop_assert_eq!(row.len(), width);
    }

    #[test]
    fn integer_text_round_trips(i in any::<i64>()) {
        let n = ValueNormalizer::default();
        prop_assert_eq!(n.normalize_cell(i.to_string().into()), Value::Integer(i));
    }
}

#[test]
fn values_keep_their_variant_through_serde() {
    let values = vec![
        Value::Null,
        Value::Integer(-7),
        dec("1.5"),
        Value::Float(1e300),
        Value::Text("1.5".to_string()),
        Value::Text(String::new()),
    ];
    let json = serde_json::to_string(&values).unwrap();
    let back: Vec<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, values);
}

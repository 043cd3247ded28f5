use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use tabload::ingestion::{load_from_path, load_from_text, LoadOptions};
use tabload::naming::TableCounter;
use tabload::types::Value;
use tabload::LoadError;

fn fresh() -> LoadOptions {
    LoadOptions {
        counter: Arc::new(TableCounter::new()),
        ..Default::default()
    }
}

fn dec(s: &str) -> Value {
    Value::Real(Decimal::from_str(s).unwrap())
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn array_of_objects_uses_sorted_key_union() {
    let tables = load_from_text(r#"[{"a":1},{"b":2.1,"c":"bb"}]"#, "json", &fresh()).unwrap();
    assert_eq!(tables.len(), 1);
    let t = &tables[0];
    assert_eq!(t.name, "json0");
    assert_eq!(t.headers, vec!["a", "b", "c"]);
    assert_eq!(t.rows[0], vec![Value::Integer(1), Value::Null, Value::Null]);
    assert_eq!(t.rows[1], vec![Value::Null, dec("2.1"), text("bb")]);
}

#[test]
fn object_of_tables_yields_one_table_per_key() {
    let doc = r#"{"t1": [{"x": 1}], "t2": {"z": ["a"], "y": [1, 2]}}"#;
    let tables = load_from_text(doc, "json", &fresh()).unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["t1", "t2"]);

    let t2 = &tables[1];
    assert_eq!(t2.headers, vec!["y", "z"]);
    assert_eq!(
        t2.rows,
        vec![
            vec![Value::Integer(1), text("a")],
            vec![Value::Integer(2), Value::Null],
        ]
    );
}

#[test]
fn object_of_columns_is_a_single_table() {
    let tables = load_from_text(r#"{"b": [1, 2], "a": ["x", "y"]}"#, "json", &fresh()).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "json0");
    assert_eq!(tables[0].headers, vec!["a", "b"]);
    assert_eq!(tables[0].rows[1], vec![text("y"), Value::Integer(2)]);
}

#[test]
fn object_of_scalars_is_a_key_value_table() {
    let tables =
        load_from_text(r#"{"name": "tabload", "stars": 5, "ok": true, "none": null}"#, "json", &fresh())
            .unwrap();
    let t = &tables[0];
    assert_eq!(t.headers, vec!["key", "value"]);
    assert_eq!(
        t.rows,
        vec![
            vec![text("name"), text("tabload")],
            vec![text("stars"), Value::Integer(5)],
            vec![text("ok"), text("true")],
            vec![text("none"), Value::Null],
        ]
    );
}

#[test]
fn empty_documents_yield_no_tables() {
    let opts = fresh();
    assert!(load_from_text("[]", "json", &opts).unwrap().is_empty());
    assert!(load_from_text("{}", "json", &opts).unwrap().is_empty());
    assert_eq!(opts.counter.current_global_count(), 0);
}

#[test]
fn unsupported_shapes_fail_validation() {
    for doc in ["[1, 2]", r#"[{"a": [1]}]"#, "42", r#"{"a": {"b": {"c": 1}}}"#] {
        let err = load_from_text(doc, "json", &fresh()).unwrap_err();
        assert!(matches!(err, LoadError::Validation { .. }), "{doc}: {err}");
    }
}

#[test]
fn syntax_errors_are_json_errors() {
    let err = load_from_text(r#"[{"a": 1"#, "json", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
}

#[test]
fn file_tables_combine_filename_and_key() {
    let tables = load_from_path("tests/fixtures/roster.json", &fresh()).unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["roster_people", "roster_teams"]);

    let people = &tables[0];
    assert_eq!(people.headers, vec!["id", "name", "score"]);
    assert_eq!(people.rows[0], vec![Value::Integer(1), text("Ada"), Value::Null]);
    assert_eq!(people.rows[1][2], dec("87.25"));

    let teams = &tables[1];
    assert_eq!(teams.headers, vec!["size", "team"]);
    assert_eq!(teams.rows[0], vec![Value::Integer(3), text("red")]);
}

#[test]
fn json_lines_from_file() {
    let tables = load_from_path("tests/fixtures/events.jsonl", &fresh()).unwrap();
    let t = &tables[0];
    assert_eq!(t.name, "events_json_lines0");
    assert_eq!(t.headers, vec!["event", "ok", "user"]);
    assert_eq!(t.rows[0], vec![text("open"), Value::Null, Value::Integer(1)]);
    assert_eq!(t.rows[1], vec![text("close"), text("true"), Value::Integer(2)]);
}

#[test]
fn json_lines_text_by_alias() {
    let tables = load_from_text("{\"a\": 1.50}\n\n{\"a\": 2}\n", "ndjson", &fresh()).unwrap();
    assert_eq!(tables[0].name, "json_lines0");
    assert_eq!(tables[0].rows, vec![vec![dec("1.5")], vec![Value::Integer(2)]]);
}

#[test]
fn json_lines_rejects_non_objects() {
    let err = load_from_text("{\"a\": 1}\n[1]\n", "jsonl", &fresh()).unwrap_err();
    match err {
        LoadError::Validation { message, .. } => assert!(message.contains("line 2"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }

    let err = load_from_text("{\"a\": 1}\n{oops\n", "jsonl", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidData { .. }));
}

#[test]
fn long_reals_keep_every_digit() {
    let doc = r#"[{"a": 0.12345678901234567890123, "b": 18446744073709551615}]"#;
    let tables = load_from_text(doc, "json", &fresh()).unwrap();
    assert_eq!(
        tables[0].rows[0],
        vec![dec("0.12345678901234567890123"), dec("18446744073709551615")]
    );
}

use std::sync::Arc;

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

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn ltsv_headers_follow_first_appearance() {
    let tables = load_from_path("tests/fixtures/access.ltsv", &fresh()).unwrap();
    let t = &tables[0];
    assert_eq!(t.name, "access");
    assert_eq!(t.headers, vec!["host", "status", "req", "size"]);
    assert_eq!(
        t.rows[0],
        vec![text("127.0.0.1"), Value::Integer(200), text("GET / HTTP/1.1"), Value::Null]
    );
    assert_eq!(
        t.rows[1],
        vec![text("10.0.0.1"), Value::Integer(404), Value::Null, Value::Integer(512)]
    );
}

#[test]
fn ltsv_explicit_headers_select_columns() {
    let opts = LoadOptions {
        headers: vec!["size".to_string(), "host".to_string()],
        ..fresh()
    };
    let tables = load_from_text("host:a\tsize:1\nhost:b\n", "ltsv", &opts).unwrap();
    assert_eq!(tables[0].name, "ltsv0");
    assert_eq!(
        tables[0].rows,
        vec![vec![Value::Integer(1), text("a")], vec![Value::Null, text("b")]]
    );
}

#[test]
fn ltsv_rejects_bad_labels() {
    let err = load_from_text("bad label:x\n", "ltsv", &fresh()).unwrap_err();
    match err {
        LoadError::InvalidHeaderName { name, .. } => assert_eq!(name, "bad label"),
        other => panic!("unexpected error: {other}"),
    }

    let err = load_from_text("no separator here\n", "ltsv", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidData { .. }));
}

#[test]
fn markdown_emits_every_table() {
    let tables = load_from_path("tests/fixtures/notes.md", &fresh()).unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["notes_markdown0", "notes_markdown1"]);

    assert_eq!(tables[0].headers, vec!["name", "role"]);
    assert_eq!(tables[0].rows[0], vec![text("Ada"), text("math | code")]);
    assert_eq!(tables[1].rows, vec![vec![Value::Integer(1), text("2.50")]]);
}

#[test]
fn markdown_without_table_is_invalid() {
    let err = load_from_text("# Title\n\njust prose | with a pipe\n", "markdown", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidData { .. }));
}

#[test]
fn mediawiki_uses_id_and_caption() {
    let opts = LoadOptions {
        format: Some("mediawiki".to_string()),
        ..fresh()
    };
    let tables = load_from_path("tests/fixtures/planets.wiki", &opts).unwrap();
    assert_eq!(tables.len(), 1);
    let t = &tables[0];
    assert_eq!(t.name, "planets_planets");
    assert_eq!(t.headers, vec!["name", "moons"]);
    assert_eq!(
        t.rows,
        vec![
            vec![text("Earth"), Value::Integer(1)],
            vec![text("Mars"), Value::Integer(2)],
        ]
    );

    let titled = LoadOptions {
        table_name: Some("%(title)s".to_string()),
        ..opts
    };
    let tables = load_from_path("tests/fixtures/planets.wiki", &titled).unwrap();
    assert_eq!(tables[0].name, "Planets");
}

#[test]
fn mediawiki_structure_errors() {
    let err = load_from_text("{|\n! a\n|-\n| 1\n", "mediawiki", &fresh()).unwrap_err();
    assert!(err.to_string().contains("unterminated"), "{err}");

    let err = load_from_text("{|\n{|\n|}\n|}\n", "mediawiki", &fresh()).unwrap_err();
    assert!(err.to_string().contains("nested"), "{err}");

    let err = load_from_text("no tables here", "mediawiki", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidData { .. }));
}

#[test]
fn html_tables_from_file() {
    let tables = load_from_path("tests/fixtures/planets.html", &fresh()).unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["planets_inner", "planets_html1"]);

    let inner = &tables[0];
    assert_eq!(inner.headers, vec!["name", "moons"]);
    assert_eq!(inner.row_count(), 3);
    assert_eq!(inner.rows[1], vec![text("Earth"), Value::Integer(1)]);

    let outer = &tables[1];
    assert_eq!(outer.headers, vec!["name", "rings"]);
    assert_eq!(outer.rows, vec![vec![text("Saturn"), text("yes")]]);
}

#[test]
fn html_title_falls_back_to_caption() {
    let html = "<table><caption> Big   moons </caption><tr><th>m</th></tr><tr><td>Ganymede</td></tr></table>";
    let opts = LoadOptions {
        table_name: Some("%(title)s".to_string()),
        ..fresh()
    };
    let tables = load_from_text(html, "html", &opts).unwrap();
    assert_eq!(tables[0].name, "Big moons");
    assert_eq!(tables[0].rows, vec![vec![text("Ganymede")]]);
}

#[test]
fn html_nested_tables_are_separate() {
    let html = r#"<table id="outer"><tr><th>k</th><th>v</th></tr>
        <tr><td>a</td><td><table id="inner"><tr><td>9</td></tr></table></td></tr></table>"#;
    let tables = load_from_text(html, "html", &fresh()).unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["outer", "inner"]);
    assert_eq!(tables[0].row_count(), 1);
    assert!(tables[1].headers.is_empty());
    assert_eq!(tables[1].rows, vec![vec![Value::Integer(9)]]);
}

#[test]
fn html_without_table_is_invalid() {
    let err = load_from_text("<html><body><p>hi</p></body></html>", "html", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidData { .. }));
}

#[test]
fn ltsv_ignores_trailing_tabs() {
    let tables = load_from_text("a:1\tb:2\t\na:3\t\t\n", "ltsv", &fresh()).unwrap();
    assert_eq!(tables[0].headers, vec!["a", "b"]);
    assert_eq!(
        tables[0].rows,
        vec![
            vec![Value::Integer(1), Value::Integer(2)],
            vec![Value::Integer(3), Value::Null],
        ]
    );
}

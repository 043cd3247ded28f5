#![cfg(feature = "excel_test_writer")]

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tabload::ingestion::{load_from_path, LoadContext, LoadObserver, LoadOptions, LoadStats};
use tabload::naming::TableCounter;
use tabload::types::Value;
use tabload::LoadError;

fn tmp_xlsx() -> tempfile::TempPath {
    tempfile::Builder::new()
        .prefix("tabload-")
        .suffix(".xlsx")
        .tempfile()
        .unwrap()
        .into_temp_path()
}

fn fresh() -> LoadOptions {
    LoadOptions {
        counter: Arc::new(TableCounter::new()),
        ..Default::default()
    }
}

fn write_workbook(path: &Path) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    let ws = wb.add_worksheet();
    ws.set_name("people").unwrap();
    ws.write_string(0, 0, "id").unwrap();
    ws.write_string(0, 1, "name").unwrap();
    ws.write_string(0, 2, "score").unwrap();
    ws.write_string(0, 3, "active").unwrap();
    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, "Ada").unwrap();
    ws.write_number(1, 2, 98.5).unwrap();
    ws.write_boolean(1, 3, true).unwrap();
    ws.write_number(2, 0, 2).unwrap();
    ws.write_string(2, 1, "Grace").unwrap();
    ws.write_boolean(2, 3, false).unwrap();

    // No cells at all: skipped.
    let empty = wb.add_worksheet();
    empty.set_name("empty").unwrap();

    // Header starts on the third row.
    let offset = wb.add_worksheet();
    offset.set_name("offset").unwrap();
    offset.write_string(2, 0, "k").unwrap();
    offset.write_string(3, 0, "v").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn every_sheet_with_a_header_is_a_table() {
    let path = tmp_xlsx();
    write_workbook(&path);

    let tables = load_from_path(&path, &fresh()).unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["people", "offset"]);

    let people = &tables[0];
    assert_eq!(people.headers, vec!["id", "name", "score", "active"]);
    assert_eq!(
        people.rows[0],
        vec![
            Value::Integer(1),
            Value::Text("Ada".to_string()),
            Value::Real(Decimal::from_str("98.5").unwrap()),
            Value::Text("true".to_string()),
        ]
    );
    assert_eq!(people.rows[1][2], Value::Null);

    let offset = &tables[1];
    assert_eq!(offset.headers, vec!["k"]);
    assert_eq!(offset.rows, vec![vec![Value::Text("v".to_string())]]);
}

#[test]
fn sheet_and_format_tokens() {
    let path = tmp_xlsx();
    write_workbook(&path);

    let opts = LoadOptions {
        table_name: Some("%(filename)s_%(sheet)s_%(format_id)s".to_string()),
        ..fresh()
    };
    let tables = load_from_path(&path, &opts).unwrap();
    let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
    assert_eq!(tables[0].name, format!("{stem}_people_0"));
    assert_eq!(tables[1].name, format!("{stem}_offset_1"));
}

#[test]
fn corrupt_workbook_is_an_open_error() {
    let path = tmp_xlsx();
    std::fs::write(&path, b"not a zip archive").unwrap();

    let err = load_from_path(&path, &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::Open { .. }), "{err}");
}

#[derive(Default)]
struct StatsObserver {
    stats: Mutex<Vec<LoadStats>>,
}

impl LoadObserver for StatsObserver {
    fn on_success(&self, _ctx: &LoadContext, stats: LoadStats) {
        self.stats.lock().unwrap().push(stats);
    }
}

#[test]
fn sheet_without_header_is_reported_as_skipped() {
    let path = tmp_xlsx();
    write_workbook(&path);

    let obs = Arc::new(StatsObserver::default());
    let counter = Arc::new(TableCounter::new());
    let opts = LoadOptions {
        observer: Some(obs.clone()),
        counter: counter.clone(),
        ..Default::default()
    };
    load_from_path(&path, &opts).unwrap();

    assert_eq!(
        *obs.stats.lock().unwrap(),
        vec![LoadStats {
            tables: 2,
            rows: 3,
            skipped: 1
        }]
    );
    assert_eq!(counter.current_format_count("excel"), 2);
}

//! JSON and JSON Lines.
//!
//! Accepted JSON documents, tried in this order:
//!
//! 1. Multi-table: an object whose every value is itself a single-table shape A or B below.
//!    One table per key, in document order, `%(key)s` = the object key.
//! 2. Single table:
//!    - A: array of objects with scalar values: `[{"a":1}, {"b":2}]`. Headers are the sorted
//!      union of keys.
//!    - B: object of scalar arrays: `{"a":[1,2], "b":[3,4]}`. Headers are the sorted keys;
//!      shorter columns are padded with null.
//!    - C: object of scalars: `{"a":1, "b":"x"}`. Headers are `key` and `value`, one row per
//!      entry in document order.
//!
//! Only a shape mismatch in step 1 falls back to step 2. A document matching neither is a
//! [`LoadError::Validation`]. Empty top-level arrays and objects yield no tables.
//!
//! JSON Lines: one object per non-empty line, scalar values only, one table whose headers are
//! the sorted union of keys.

use std::collections::BTreeSet;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{LoadError, LoadResult};
use crate::normalize::{RawCell, RawRow, RealPolicy};

use super::adapter::{keyed_template, FormatAdapter, RawTable};
use super::source::{Source, SourceType};

/// Adapter for JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

/// Adapter for newline-delimited JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesAdapter;

/// A document does not have the shape being tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch(pub String);

impl FormatAdapter for JsonAdapter {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn default_template(&self, source_type: SourceType) -> &'static str {
        keyed_template(source_type)
    }

    fn real_policy(&self) -> RealPolicy {
        RealPolicy::Decimal
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        let text = source.read_text()?;
        let doc: JsonValue = serde_json::from_str(&text)?;
        tables_from_document(&source.id(), &doc)
    }
}

impl FormatAdapter for JsonLinesAdapter {
    fn format_name(&self) -> &'static str {
        "json_lines"
    }

    fn default_template(&self, source_type: SourceType) -> &'static str {
        keyed_template(source_type)
    }

    fn real_policy(&self) -> RealPolicy {
        RealPolicy::Decimal
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        let text = source.read_text()?;
        let source_id = source.id();

        let mut objects = Vec::new();
        for (idx0, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: JsonValue = serde_json::from_str(line).map_err(|e| {
                LoadError::invalid_data(&source_id, format!("invalid json at line {}: {e}", idx0 + 1))
            })?;
            match value {
                JsonValue::Object(obj) => objects.push(obj),
                other => {
                    return Err(LoadError::validation(
                        &source_id,
                        format!("line {} is not a json object: {other}", idx0 + 1),
                    ));
                }
            }
        }

        let table = records_table(objects.iter())
            .map_err(|ShapeMismatch(msg)| LoadError::validation(&source_id, msg))?;
        Ok(vec![table])
    }
}

/// Convert a parsed JSON document into raw tables.
///
/// # Errors
///
/// [`LoadError::Validation`] when the document matches no accepted shape.
pub fn tables_from_document(source_id: &str, doc: &JsonValue) -> LoadResult<Vec<RawTable>> {
    if is_empty_container(doc) {
        return Ok(Vec::new());
    }

    let multi_err = match multi_table(doc) {
        Ok(tables) => return Ok(tables),
        Err(ShapeMismatch(msg)) => msg,
    };
    match single_table(doc) {
        Ok(table) => Ok(vec![table]),
        Err(ShapeMismatch(single_err)) => Err(LoadError::validation(
            source_id,
            format!(
                "json matches no table shape (as multiple tables: {multi_err}; as a single table: {single_err})"
            ),
        )),
    }
}

fn is_empty_container(doc: &JsonValue) -> bool {
    match doc {
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn multi_table(doc: &JsonValue) -> Result<Vec<RawTable>, ShapeMismatch> {
    let JsonValue::Object(map) = doc else {
        return Err(ShapeMismatch("top-level value is not an object".to_string()));
    };

    map.iter()
        .map(|(key, value)| {
            let table = match value {
                JsonValue::Array(items) => records_table(objects_of(key, items)?.into_iter()),
                JsonValue::Object(columns) => columns_table(columns),
                other => Err(ShapeMismatch(format!(
                    "value of '{key}' is not an array or object: {other}"
                ))),
            }?;
            Ok::<_, ShapeMismatch>(table.with_key(key.clone()))
        })
        .collect()
}

fn single_table(doc: &JsonValue) -> Result<RawTable, ShapeMismatch> {
    match doc {
        JsonValue::Array(items) => records_table(objects_of("<root>", items)?.into_iter()),
        JsonValue::Object(map) if map.values().all(JsonValue::is_array) => columns_table(map),
        JsonValue::Object(map) => key_value_table(map),
        other => Err(ShapeMismatch(format!(
            "top-level value must be an array or object, got: {other}"
        ))),
    }
}

fn objects_of<'a>(
    key: &str,
    items: &'a [JsonValue],
) -> Result<Vec<&'a Map<String, JsonValue>>, ShapeMismatch> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_object().ok_or_else(|| {
                ShapeMismatch(format!("'{key}' item {} is not an object: {item}", idx + 1))
            })
        })
        .collect()
}

/// Shape A: records with varying keys; headers are the sorted key union.
fn records_table<'a>(
    records: impl Iterator<Item = &'a Map<String, JsonValue>> + Clone,
) -> Result<RawTable, ShapeMismatch> {
    let headers: Vec<String> = records
        .clone()
        .flat_map(|obj| obj.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = records
        .enumerate()
        .map(|(idx, obj)| {
            let cells = obj
                .iter()
                .map(|(k, v)| {
                    scalar_cell(v)
                        .map(|cell| (k.clone(), cell))
                        .ok_or_else(|| {
                            ShapeMismatch(format!(
                                "record {} field '{k}' is not a scalar: {v}",
                                idx + 1
                            ))
                        })
                })
                .collect::<Result<IndexMap<_, _>, _>>()?;
            Ok::<_, ShapeMismatch>(RawRow::Mapping(cells))
        })
        .collect::<Result<Vec<_>, ShapeMismatch>>()?;

    Ok(RawTable::new(headers, rows))
}

/// Shape B: column arrays keyed by header.
fn columns_table(map: &Map<String, JsonValue>) -> Result<RawTable, ShapeMismatch> {
    let mut columns: Vec<(&String, Vec<RawCell>)> = Vec::with_capacity(map.len());
    for (key, value) in map {
        let JsonValue::Array(items) = value else {
            return Err(ShapeMismatch(format!("column '{key}' is not an array: {value}")));
        };
        let cells = items
            .iter()
            .map(|v| {
                scalar_cell(v).ok_or_else(|| {
                    ShapeMismatch(format!("column '{key}' holds a non-scalar value: {v}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        columns.push((key, cells));
    }
    columns.sort_by(|a, b| a.0.cmp(b.0));

    let height = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    let headers = columns.iter().map(|(k, _)| (*k).clone()).collect();
    let mut iters: Vec<_> = columns.into_iter().map(|(_, c)| c.into_iter()).collect();
    let rows = (0..height)
        .map(|_| RawRow::Sequence(iters.iter_mut().map(|it| it.next().unwrap_or(RawCell::Null)).collect()))
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Shape C: one `key`/`value` row per entry.
fn key_value_table(map: &Map<String, JsonValue>) -> Result<RawTable, ShapeMismatch> {
    let rows = map
        .iter()
        .map(|(k, v)| {
            let cell = scalar_cell(v)
                .ok_or_else(|| ShapeMismatch(format!("value of '{k}' is not a scalar: {v}")))?;
            Ok::<_, ShapeMismatch>(RawRow::Sequence(vec![RawCell::Text(k.clone()), cell]))
        })
        .collect::<Result<Vec<_>, ShapeMismatch>>()?;
    Ok(RawTable::new(
        vec!["key".to_string(), "value".to_string()],
        rows,
    ))
}

fn scalar_cell(v: &JsonValue) -> Option<RawCell> {
    match v {
        JsonValue::Null => Some(RawCell::Null),
        JsonValue::Bool(b) => Some(RawCell::Bool(*b)),
        JsonValue::Number(n) => Some(number_cell(n)),
        JsonValue::String(s) => Some(RawCell::Text(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn number_cell(n: &Number) -> RawCell {
    if let Some(i) = n.as_i64() {
        return RawCell::Int(i);
    }
    // The literal as written, so reals longer than an f64 keep every digit.
    let text = n.as_str();
    match Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        Ok(d) => RawCell::Decimal(d),
        Err(_) => RawCell::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

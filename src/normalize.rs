//! Cell type inference and row-shape normalization.
//!
//! Format adapters hand over weakly typed [`RawCell`]s grouped into [`RawRow`]s. The
//! [`ValueNormalizer`] turns them into canonical [`Value`]s and aligns every row to the table
//! headers.
//!
//! Per cell:
//!
//! - `Null` stays [`Value::Null`].
//! - Text matching the integer grammar (`[+-]?digits`, fitting in `i64`) becomes
//!   [`Value::Integer`].
//! - Text matching the real grammar follows the configured [`RealPolicy`].
//! - Anything else is kept as [`Value::Text`].

use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{LoadError, LoadResult};
use crate::types::Value;

static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+$").expect("integer grammar is a valid regex")
});

static REAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("real grammar is a valid regex")
});

/// A cell as produced by a format adapter, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Explicit null / missing value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Already-typed integer.
    Int(i64),
    /// Already-typed binary float.
    Float(f64),
    /// Already-typed decimal.
    Decimal(Decimal),
    /// Raw text, still subject to type inference.
    Text(String),
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for RawCell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// The shape of one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRow {
    /// Cells keyed by column name (e.g. a JSON object or an LTSV line).
    Mapping(IndexMap<String, RawCell>),
    /// A record with named fields in declaration order.
    Record(Vec<(String, RawCell)>),
    /// Positional cells.
    Sequence(Vec<RawCell>),
    /// A lone value where a record was expected. Always rejected during normalization.
    Scalar(RawCell),
}

impl RawRow {
    /// Build a positional row from anything convertible into cells.
    pub fn sequence<I, T>(cells: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawCell>,
    {
        Self::Sequence(cells.into_iter().map(Into::into).collect())
    }

    /// Build a named-field record.
    pub fn record<I, K, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<RawCell>,
    {
        Self::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn shape_name(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::Record(_) => "record",
            Self::Sequence(_) => "sequence",
            Self::Scalar(_) => "scalar",
        }
    }
}

/// What to do with text that looks like a real number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RealPolicy {
    /// Keep real-looking text as `Text`, exactly as written.
    #[default]
    PreserveText,
    /// Convert to [`Value::Real`] (or [`Value::Float`] when a decimal cannot hold it).
    Decimal,
}

/// Converts raw cells and rows into canonical values.
#[derive(Debug, Clone, Default)]
pub struct ValueNormalizer {
    /// Policy for real-looking text.
    pub real_policy: RealPolicy,
    /// Characters trimmed from both ends of text cells before inference.
    pub strip_chars: String,
}

impl ValueNormalizer {
    /// Create a normalizer with the given real policy and no strip characters.
    pub fn new(real_policy: RealPolicy) -> Self {
        Self {
            real_policy,
            strip_chars: String::new(),
        }
    }

    /// Set the characters trimmed from text cells.
    pub fn with_strip_chars(mut self, strip_chars: impl Into<String>) -> Self {
        self.strip_chars = strip_chars.into();
        self
    }

    /// Normalize one cell.
    pub fn normalize_cell(&self, raw: RawCell) -> Value {
        match raw {
            RawCell::Null => Value::Null,
            RawCell::Bool(b) => Value::Text(b.to_string()),
            RawCell::Int(i) => Value::Integer(i),
            RawCell::Decimal(d) => Value::Real(d),
            RawCell::Float(f) => float_to_value(f),
            RawCell::Text(s) => self.normalize_text(&s),
        }
    }

    fn normalize_text(&self, raw: &str) -> Value {
        let text = if self.strip_chars.is_empty() {
            raw
        } else {
            raw.trim_matches(|c| self.strip_chars.contains(c))
        };

        if INTEGER_RE.is_match(text) {
            if let Ok(i) = text.parse::<i64>() {
                return Value::Integer(i);
            }
        }

        if is_real_literal(text) {
            return match self.real_policy {
                RealPolicy::PreserveText => Value::Text(text.to_string()),
                RealPolicy::Decimal => parse_real(text),
            };
        }

        Value::Text(text.to_string())
    }

    /// Normalize one row against `headers`.
    ///
    /// `row_idx` is 0-based and only used for error messages.
    pub fn normalize_row(
        &self,
        source_id: &str,
        row_idx: usize,
        headers: &[String],
        row: RawRow,
    ) -> LoadResult<Vec<Value>> {
        if headers.is_empty() {
            return match row {
                RawRow::Mapping(map) => Ok(map.into_values().map(|c| self.normalize_cell(c)).collect()),
                RawRow::Record(fields) => Ok(fields
                    .into_iter()
                    .map(|(_, c)| self.normalize_cell(c))
                    .collect()),
                RawRow::Sequence(cells) => Ok(cells.into_iter().map(|c| self.normalize_cell(c)).collect()),
                other => Err(unsupported_shape(source_id, row_idx, &other)),
            };
        }

        match row {
            RawRow::Mapping(mut map) => Ok(headers
                .iter()
                .map(|h| self.normalize_cell(map.swap_remove(h).unwrap_or(RawCell::Null)))
                .collect()),
            RawRow::Record(mut fields) => Ok(headers
                .iter()
                .map(|h| {
                    let cell = fields
                        .iter()
                        .position(|(name, _)| name == h)
                        .map(|idx| std::mem::replace(&mut fields[idx].1, RawCell::Null))
                        .unwrap_or(RawCell::Null);
                    self.normalize_cell(cell)
                })
                .collect()),
            RawRow::Sequence(cells) => {
                let mut out: Vec<Value> = cells
                    .into_iter()
                    .take(headers.len())
                    .map(|c| self.normalize_cell(c))
                    .collect();
                out.resize(headers.len(), Value::Null);
                Ok(out)
            }
            other => Err(unsupported_shape(source_id, row_idx, &other)),
        }
    }

    /// Normalize every row of a table, in order.
    pub fn normalize_rows(
        &self,
        source_id: &str,
        headers: &[String],
        rows: Vec<RawRow>,
    ) -> LoadResult<Vec<Vec<Value>>> {
        rows.into_iter()
            .enumerate()
            .map(|(idx, row)| self.normalize_row(source_id, idx, headers, row))
            .collect()
    }
}

fn unsupported_shape(source_id: &str, row_idx: usize, row: &RawRow) -> LoadError {
    LoadError::invalid_data(
        source_id,
        format!(
            "row {} has unsupported shape '{}' (expected mapping, record or sequence): {row:?}",
            row_idx + 1,
            row.shape_name()
        ),
    )
}

fn is_real_literal(text: &str) -> bool {
    if REAL_RE.is_match(text) {
        return true;
    }
    let unsigned = text.trim_start_matches(['+', '-']);
    ["nan", "inf", "infinity"]
        .iter()
        .any(|w| unsigned.eq_ignore_ascii_case(w))
}

fn parse_real(text: &str) -> Value {
    let unsigned = text.trim_start_matches('+');
    if let Ok(d) = Decimal::from_str(unsigned) {
        return Value::Real(d);
    }
    if let Ok(d) = Decimal::from_scientific(unsigned) {
        return Value::Real(d);
    }
    match unsigned.parse::<f64>() {
        Ok(f) => Value::Float(f),
        Err(_) => Value::Text(text.to_string()),
    }
}

/// Convert a typed float, preferring an exact decimal of its shortest textual form.
pub(crate) fn float_to_value(f: f64) -> Value {
    if !f.is_finite() {
        return Value::Float(f);
    }
    let text = f.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Value::Real)
        .unwrap_or(Value::Float(f))
}

//! Core data model types for loading.
//!
//! Every format is loaded into one or more [`Table`]s: a name, an ordered header list and a
//! row-major matrix of [`Value`]s.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single normalized cell value.
///
/// Serialized externally tagged (`{"Integer": 1}`, `{"Real": "1.5"}`, `{"Text": "1.5"}`) so a
/// value reads back as the same variant. JSON has no NaN or infinities; serializing such a
/// [`Value::Float`] with `serde_json` yields `null`, which does not deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// Decimal real number, kept exact to avoid binary float drift.
    Real(Decimal),
    /// Binary float, used only for values a [`Decimal`] cannot hold (NaN, infinities, very
    /// large or very small magnitudes).
    Float(f64),
    /// UTF-8 string.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the integer payload, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the decimal payload, if this is a real.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Real(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns `true` for float NaN and for the text `NaN` (case-insensitive).
    pub fn is_nan(&self) -> bool {
        match self {
            Self::Float(f) => f.is_nan(),
            Self::Text(s) => s.trim().eq_ignore_ascii_case("nan"),
            _ => false,
        }
    }

    /// Cell equality used by [`Table`]: like `==`, except any two NaN-like cells are equal.
    pub fn loosely_eq(&self, other: &Self) -> bool {
        self == other || (self.is_nan() && other.is_nan())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(d) => write!(f, "{d}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A named in-memory table.
///
/// When `headers` is non-empty every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Final, sanitized table name.
    pub name: String,
    /// Column names. Empty when the source has no header row.
    pub headers: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from its parts.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (header count, or the widest row when there are no headers).
    pub fn column_count(&self) -> usize {
        if self.headers.is_empty() {
            self.rows.iter().map(Vec::len).max().unwrap_or(0)
        } else {
            self.headers.len()
        }
    }

    /// Returns the index of a column by header name, if present.
    pub fn index_of(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Returns `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.headers == other.headers
            && self.rows.len() == other.rows.len()
            && self.rows.iter().zip(&other.rows).all(|(a, b)| {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_eq(y))
            })
    }
}

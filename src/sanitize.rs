//! Table name and header sanitization.
//!
//! A [`SanitizerProfile`] describes the naming rules of a destination. [`sanitize`] runs each
//! name and header through the same steps:
//!
//! 1. preprocess
//! 2. validate
//! 3. on a fixable violation, rename and validate again (a second failure is fatal)
//! 4. on a tolerable violation (valid but reserved), accept as-is
//!
//! [`PermissiveProfile`] is the default and never rejects anything. [`SqliteProfile`] produces
//! names usable as SQLite identifiers.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::{LoadError, LoadResult};

/// Why a name failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The name is empty.
    Empty,
    /// The name starts with a digit.
    LeadingDigit,
    /// The name uses a prefix reserved by the destination.
    ReservedPrefix(String),
    /// The name is a keyword the destination rejects as an identifier.
    ReservedWord(String),
    /// The name is a keyword the destination still accepts as an identifier.
    ValidReservedWord(String),
    /// The name contains a character the destination cannot represent.
    InvalidCharacter(char),
}

impl Violation {
    /// Whether renaming can fix this violation.
    pub fn is_fixable(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::LeadingDigit | Self::ReservedPrefix(_) | Self::ReservedWord(_)
        )
    }

    /// Whether the name may be used despite this violation.
    pub fn is_tolerable(&self) -> bool {
        matches!(self, Self::ValidReservedWord(_))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("name is empty"),
            Self::LeadingDigit => f.write_str("name starts with a digit"),
            Self::ReservedPrefix(p) => write!(f, "prefix '{p}' is reserved"),
            Self::ReservedWord(w) => write!(f, "'{w}' is a reserved word"),
            Self::ValidReservedWord(w) => write!(f, "'{w}' is a reserved word (allowed)"),
            Self::InvalidCharacter(c) => write!(f, "invalid character {c:?}"),
        }
    }
}

/// Naming rules for one destination.
pub trait SanitizerProfile: Send + Sync + fmt::Debug {
    /// Clean up a table name before validation.
    fn preprocess_name(&self, name: &str) -> String;

    /// Check a preprocessed table name.
    fn validate_name(&self, name: &str) -> Result<(), Violation>;

    /// Rename a table name that failed with a fixable violation.
    fn rename_name(&self, name: &str) -> String;

    /// Clean up the header at `col_idx` before validation.
    fn preprocess_header(&self, col_idx: usize, header: &str) -> String;

    /// Check a preprocessed header.
    fn validate_header(&self, header: &str) -> Result<(), Violation>;

    /// Rename a header that failed with a fixable violation.
    fn rename_header(&self, header: &str) -> String;
}

/// Sanitize a table name and its headers under `profile`.
///
/// The returned headers have the same length and order as the input.
///
/// # Errors
///
/// [`LoadError::InvalidTableName`] / [`LoadError::InvalidHeaderName`] when a value violates a
/// fatal rule or is still invalid after renaming.
pub fn sanitize(
    profile: &dyn SanitizerProfile,
    name: &str,
    headers: &[String],
) -> LoadResult<(String, Vec<String>)> {
    let name = apply_rules(
        profile.preprocess_name(name),
        |n| profile.validate_name(n),
        |n| profile.rename_name(n),
    )
    .map_err(|(name, violation)| LoadError::InvalidTableName {
        name,
        message: violation.to_string(),
    })?;

    let headers = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            apply_rules(
                profile.preprocess_header(idx, header),
                |h| profile.validate_header(h),
                |h| profile.rename_header(h),
            )
            .map_err(|(name, violation)| LoadError::InvalidHeaderName {
                name,
                message: violation.to_string(),
            })
        })
        .collect::<LoadResult<Vec<_>>>()?;

    Ok((name, headers))
}

fn apply_rules(
    value: String,
    validate: impl Fn(&str) -> Result<(), Violation>,
    rename: impl Fn(&str) -> String,
) -> Result<String, (String, Violation)> {
    match validate(&value) {
        Ok(()) => Ok(value),
        Err(v) if v.is_tolerable() => Ok(value),
        Err(v) if v.is_fixable() => {
            let renamed = rename(&value);
            match validate(&renamed) {
                Ok(()) => Ok(renamed),
                Err(v) if v.is_tolerable() => Ok(renamed),
                Err(v) => Err((renamed, v)),
            }
        }
        Err(v) => Err((value, v)),
    }
}

/// The default profile: trims `strip_chars` from table name edges and accepts everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissiveProfile {
    /// Characters trimmed from both ends of the table name.
    pub strip_chars: String,
}

impl Default for PermissiveProfile {
    fn default() -> Self {
        Self {
            strip_chars: " \t\r\n".to_string(),
        }
    }
}

impl PermissiveProfile {
    /// Create a profile trimming the given characters.
    pub fn new(strip_chars: impl Into<String>) -> Self {
        Self {
            strip_chars: strip_chars.into(),
        }
    }
}

impl SanitizerProfile for PermissiveProfile {
    fn preprocess_name(&self, name: &str) -> String {
        let trimmed = name.trim_matches(|c| self.strip_chars.contains(c));
        if trimmed.is_empty() {
            name.to_string()
        } else {
            trimmed.to_string()
        }
    }

    fn validate_name(&self, _name: &str) -> Result<(), Violation> {
        Ok(())
    }

    fn rename_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn preprocess_header(&self, _col_idx: usize, header: &str) -> String {
        header.to_string()
    }

    fn validate_header(&self, _header: &str) -> Result<(), Violation> {
        Ok(())
    }

    fn rename_header(&self, header: &str) -> String {
        header.to_string()
    }
}

/// Shared default profile.
pub fn default_profile() -> Arc<dyn SanitizerProfile> {
    Arc::new(PermissiveProfile::default())
}

static INVALID_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

// Keywords SQLite refuses as bare identifiers.
const SQLITE_FORBIDDEN_KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "AUTOINCREMENT", "BETWEEN", "CASE", "CHECK", "COLLATE",
    "COMMIT", "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DEFERRABLE", "DELETE", "DISTINCT",
    "DROP", "ELSE", "ESCAPE", "EXCEPT", "EXISTS", "FOREIGN", "FROM", "GROUP", "HAVING", "IN",
    "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "LEFT", "LIMIT",
    "NATURAL", "NOT", "NOTNULL", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES",
    "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "TRANSACTION", "UNION", "UNIQUE", "UPDATE",
    "USING", "VALUES", "WHEN", "WHERE",
];

// Keywords SQLite still accepts as identifiers.
const SQLITE_ALLOWED_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "AFTER", "ANALYZE", "ASC", "ATTACH", "BEFORE", "BEGIN", "BY", "CASCADE",
    "CAST", "COLUMN", "CONFLICT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "DATABASE", "DEFERRED", "DESC", "DETACH", "EACH", "END", "EXCLUSIVE", "EXPLAIN", "FAIL",
    "FOR", "FULL", "GLOB", "IF", "IGNORE", "IMMEDIATE", "INDEXED", "INITIALLY", "INSTEAD", "KEY",
    "LIKE", "MATCH", "NO", "OF", "OFFSET", "PLAN", "PRAGMA", "QUERY", "RAISE", "RECURSIVE",
    "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT", "ROLLBACK", "ROW",
    "SAVEPOINT", "TEMP", "TEMPORARY", "TRIGGER", "VACUUM", "VIEW", "VIRTUAL", "WITH", "WITHOUT",
];

static FORBIDDEN: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SQLITE_FORBIDDEN_KEYWORDS.iter().copied().collect());

static ALLOWED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SQLITE_ALLOWED_KEYWORDS.iter().copied().collect());

fn keyword_violation(value: &str) -> Option<Violation> {
    let upper = value.to_ascii_uppercase();
    if FORBIDDEN.contains(upper.as_str()) {
        Some(Violation::ReservedWord(value.to_string()))
    } else if ALLOWED.contains(upper.as_str()) {
        Some(Violation::ValidReservedWord(value.to_string()))
    } else {
        None
    }
}

/// Spreadsheet-style column label for a 0-based index: `A`..`Z`, `AA`, `AB`, ...
pub fn column_label(mut col_idx: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (col_idx % 26) as u8);
        if col_idx < 26 {
            break;
        }
        col_idx = col_idx / 26 - 1;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Strict profile producing valid SQLite table and column identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteProfile {
    /// Prefix added to names that need renaming.
    pub rename_prefix: String,
}

impl Default for SqliteProfile {
    fn default() -> Self {
        Self {
            rename_prefix: "rename_".to_string(),
        }
    }
}

impl SanitizerProfile for SqliteProfile {
    fn preprocess_name(&self, name: &str) -> String {
        INVALID_NAME_CHARS
            .replace_all(name.trim(), "_")
            .into_owned()
    }

    fn validate_name(&self, name: &str) -> Result<(), Violation> {
        let Some(first) = name.chars().next() else {
            return Err(Violation::Empty);
        };
        if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(Violation::InvalidCharacter(bad));
        }
        if first.is_ascii_digit() {
            return Err(Violation::LeadingDigit);
        }
        if name.to_ascii_lowercase().starts_with("sqlite_") {
            return Err(Violation::ReservedPrefix("sqlite_".to_string()));
        }
        match keyword_violation(name) {
            Some(v) => Err(v),
            None => Ok(()),
        }
    }

    fn rename_name(&self, name: &str) -> String {
        format!("{}{name}", self.rename_prefix)
    }

    fn preprocess_header(&self, col_idx: usize, header: &str) -> String {
        let cleaned: String = header.chars().filter(|c| !c.is_control()).collect();
        match cleaned.trim() {
            "" => column_label(col_idx),
            trimmed => trimmed.to_string(),
        }
    }

    fn validate_header(&self, header: &str) -> Result<(), Violation> {
        if header.is_empty() {
            return Err(Violation::Empty);
        }
        if let Some(bad) = header.chars().find(|c| c.is_control()) {
            return Err(Violation::InvalidCharacter(bad));
        }
        match keyword_violation(header) {
            Some(v) => Err(v),
            None => Ok(()),
        }
    }

    fn rename_header(&self, header: &str) -> String {
        format!("{}{header}", self.rename_prefix)
    }
}

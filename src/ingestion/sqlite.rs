#![cfg(feature = "sqlite")]

//! SQLite databases: every user table, in creation order.
//!
//! Tables are named after the SQL table unless the caller sets a template, in which case
//! `%(key)s` holds the SQL table name.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::error::{LoadError, LoadResult};
use crate::normalize::{RawCell, RawRow, RealPolicy};

use super::adapter::{FormatAdapter, RawTable, FORMAT_ID_TEMPLATE};
use super::source::{Source, SourceKind, SourceType};

/// Adapter for SQLite database files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl SqliteAdapter {
    /// Read every user table of the database at `path`.
    pub fn parse_path(&self, path: &Path) -> LoadResult<Vec<RawTable>> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |e| LoadError::Open {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        )?;

        let names: Vec<String> = {
            let mut stmt = conn
                .prepare(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
                     ORDER BY rowid",
                )
                .map_err(|e| LoadError::Open {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<_, _>>()?
        };

        names
            .into_iter()
            .map(|name| read_table(&conn, &name))
            .collect()
    }
}

impl FormatAdapter for SqliteAdapter {
    fn format_name(&self) -> &'static str {
        "sqlite"
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn default_template(&self, _source_type: SourceType) -> &'static str {
        FORMAT_ID_TEMPLATE
    }

    fn real_policy(&self) -> RealPolicy {
        RealPolicy::Decimal
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        self.parse_path(source.file_path()?)
    }
}

fn read_table(conn: &Connection, name: &str) -> LoadResult<RawTable> {
    let sql = format!("SELECT * FROM \"{}\"", name.replace('"', "\"\""));
    let mut stmt = conn.prepare(&sql)?;
    let headers: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut query = stmt.query([])?;
    while let Some(row) = query.next()? {
        let cells = (0..width)
            .map(|idx| row.get_ref(idx).map(convert_value))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(RawRow::Sequence(cells));
    }

    let mut table = RawTable::new(headers, rows).with_key(name);
    table.name_override = Some(name.to_string());
    Ok(table)
}

fn convert_value(v: ValueRef<'_>) -> RawCell {
    match v {
        ValueRef::Null => RawCell::Null,
        ValueRef::Integer(i) => RawCell::Int(i),
        ValueRef::Real(f) => RawCell::Float(f),
        ValueRef::Text(bytes) => RawCell::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => RawCell::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

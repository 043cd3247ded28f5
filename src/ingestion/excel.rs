#![cfg(feature = "excel")]

//! Spreadsheet workbooks (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
//!
//! Behavior:
//! - Every sheet is a table, in workbook order; `%(sheet)s` is the sheet name.
//! - The first non-empty row is the header row; rows above it are ignored.
//! - A sheet without any non-empty row cannot be interpreted; it is returned as
//!   [`RawTable::unreadable`] and the loader skips it ([`FailurePolicy::SkipTable`]).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::error::{LoadError, LoadResult};
use crate::normalize::{RawCell, RawRow, RealPolicy};

use super::adapter::{FailurePolicy, FormatAdapter, RawTable, SHEET_TEMPLATE};
use super::source::{Source, SourceKind, SourceType};

/// Adapter for spreadsheet workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelAdapter;

impl ExcelAdapter {
    /// Read every sheet of the workbook at `path`.
    pub fn parse_path(&self, path: &Path) -> LoadResult<Vec<RawTable>> {
        let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut tables = Vec::new();
        for sheet in workbook.sheet_names().to_vec() {
            let range = workbook.worksheet_range(&sheet).map_err(|e| LoadError::Open {
                path: path.display().to_string(),
                message: format!("sheet '{sheet}': {e}"),
            })?;
            let table = sheet_table(&range).unwrap_or_else(|| {
                RawTable::unreadable(format!("sheet '{sheet}' has no header row"))
            });
            tables.push(table.with_sheet(sheet));
        }
        Ok(tables)
    }
}

impl FormatAdapter for ExcelAdapter {
    fn format_name(&self) -> &'static str {
        "excel"
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn default_template(&self, _source_type: SourceType) -> &'static str {
        SHEET_TEMPLATE
    }

    fn real_policy(&self) -> RealPolicy {
        RealPolicy::Decimal
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::SkipTable
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        self.parse_path(source.file_path()?)
    }
}

fn sheet_table(range: &Range<Data>) -> Option<RawTable> {
    let mut rows = range.rows();
    let header_row = rows.find(|row| row.iter().any(|c| !matches!(c, Data::Empty)))?;
    let headers: Vec<String> = header_row.iter().map(cell_to_header_string).collect();

    let data = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| RawRow::Sequence(row.iter().map(convert_cell).collect()))
        .collect();

    Some(RawTable::new(headers, data))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> RawCell {
    match c {
        Data::Empty => RawCell::Null,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => RawCell::Int(*f as i64),
        Data::Float(f) => RawCell::Float(*f),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => RawCell::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Text(format!("{e:?}")),
    }
}

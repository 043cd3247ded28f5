//! Markdown pipe tables.
//!
//! A table is a header line, a delimiter line (`| --- | :-: |`), then body lines up to the
//! first line without a `|`. Every table in the document is emitted, in order. `\|` is a
//! literal pipe inside a cell.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{LoadError, LoadResult};
use crate::normalize::RawRow;

use super::adapter::{keyed_template, FormatAdapter, RawTable};
use super::source::{Source, SourceType};

static DELIMITER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?\s*$").expect("valid regex")
});

/// Adapter for Markdown tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownAdapter;

impl MarkdownAdapter {
    /// Find every pipe table in `text`.
    pub fn parse_text(&self, source_id: &str, text: &str) -> LoadResult<Vec<RawTable>> {
        let lines: Vec<&str> = text.lines().collect();
        let mut tables = Vec::new();
        let mut idx = 0;

        while idx + 1 < lines.len() {
            let header_line = lines[idx];
            let delimiter_line = lines[idx + 1];
            if !header_line.contains('|') || !DELIMITER_RE.is_match(delimiter_line) {
                idx += 1;
                continue;
            }

            let headers = split_row(header_line);
            let mut rows = Vec::new();
            idx += 2;
            while idx < lines.len() && lines[idx].contains('|') && !lines[idx].trim().is_empty() {
                rows.push(RawRow::sequence(split_row(lines[idx])));
                idx += 1;
            }
            tables.push(RawTable::new(headers, rows));
        }

        if tables.is_empty() {
            return Err(LoadError::invalid_data(source_id, "markdown table not found"));
        }
        Ok(tables)
    }
}

impl FormatAdapter for MarkdownAdapter {
    fn format_name(&self) -> &'static str {
        "markdown"
    }

    fn default_template(&self, source_type: SourceType) -> &'static str {
        keyed_template(source_type)
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        let text = source.read_text()?;
        self.parse_text(&source.id(), &text)
    }
}

/// Split one table line into trimmed cells, honoring `\|` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut line = line.trim();
    line = line.strip_prefix('|').unwrap_or(line);
    if line.ends_with('|') && !line.ends_with("\\|") {
        line = &line[..line.len() - 1];
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

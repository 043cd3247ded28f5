//! Labeled Tab-separated Values (`label:value<TAB>label:value`).
//!
//! Headers are the labels in order of first appearance; a record missing a label gets null.
//! Empty fields (e.g. from a trailing tab) are ignored.
//! Labels must match `[0-9A-Za-z_.-]+`.

use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::error::{LoadError, LoadResult};
use crate::normalize::{RawCell, RawRow};

use super::adapter::{delimited_template, FormatAdapter, RawTable};
use super::source::{Source, SourceType};

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_.\-]+$").expect("valid regex"));

/// Adapter for LTSV.
#[derive(Debug, Clone, Default)]
pub struct LtsvAdapter {
    headers: Vec<String>,
}

impl LtsvAdapter {
    /// Create an adapter. Non-empty `headers` select and order the output columns.
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers }
    }

    /// Parse LTSV text into one raw table.
    pub fn parse_text(&self, source_id: &str, text: &str) -> LoadResult<RawTable> {
        let mut labels: IndexSet<String> = IndexSet::new();
        let mut rows = Vec::new();

        for (idx0, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let mut record: IndexMap<String, RawCell> = IndexMap::new();
            for field in line.split('\t').filter(|f| !f.trim().is_empty()) {
                let Some((label, value)) = field.split_once(':') else {
                    return Err(LoadError::invalid_data(
                        source_id,
                        format!("line {}: field '{field}' has no ':' separator", idx0 + 1),
                    ));
                };
                let label = label.trim();
                if !LABEL_RE.is_match(label) {
                    return Err(LoadError::InvalidHeaderName {
                        name: label.to_string(),
                        message: format!(
                            "line {} of {source_id}: ltsv labels must match [0-9A-Za-z_.-]+",
                            idx0 + 1
                        ),
                    });
                }
                labels.insert(label.to_string());
                record.insert(label.to_string(), RawCell::Text(value.to_string()));
            }
            rows.push(RawRow::Mapping(record));
        }

        if rows.is_empty() {
            return Err(LoadError::invalid_data(source_id, "ltsv has no records"));
        }

        let headers = if self.headers.is_empty() {
            labels.into_iter().collect()
        } else {
            self.headers.clone()
        };
        Ok(RawTable::new(headers, rows))
    }
}

impl FormatAdapter for LtsvAdapter {
    fn format_name(&self) -> &'static str {
        "ltsv"
    }

    fn default_template(&self, source_type: SourceType) -> &'static str {
        delimited_template(source_type)
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        let text = source.read_text()?;
        Ok(vec![self.parse_text(&source.id(), &text)?])
    }
}

//! MediaWiki tables.
//!
//! ```text
//! {| class="wikitable" id="planets"
//! |+ Planets
//! ! name !! moons
//! |-
//! | Earth || 1
//! |-
//! | Mars || 2
//! |}
//! ```
//!
//! Header cells (`!`) seen before the first data cell form the header row. The `id` attribute
//! of `{|` is the table key and the caption (`|+`) is the title. Cell attributes
//! (`style="..." | value`) are dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{LoadError, LoadResult};
use crate::normalize::RawRow;

use super::adapter::{keyed_template, FormatAdapter, RawTable};
use super::source::{Source, SourceType};

static ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bid\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']+))"#).expect("valid regex")
});

/// Adapter for MediaWiki tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaWikiAdapter;

#[derive(Default)]
struct TableBuilder {
    id: Option<String>,
    caption: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    current: Vec<String>,
}

impl TableBuilder {
    fn end_row(&mut self) {
        if !self.current.is_empty() {
            self.rows.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> RawTable {
        self.end_row();
        let mut table = RawTable::new(
            self.headers,
            self.rows.into_iter().map(RawRow::sequence).collect(),
        );
        table.key = self.id;
        table.title = self.caption;
        table
    }
}

impl MediaWikiAdapter {
    /// Find every table in `text`. Nested tables are not supported.
    pub fn parse_text(&self, source_id: &str, text: &str) -> LoadResult<Vec<RawTable>> {
        let mut tables = Vec::new();
        let mut builder: Option<TableBuilder> = None;

        for (idx0, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();

            if let Some(attrs) = line.strip_prefix("{|") {
                if builder.is_some() {
                    return Err(LoadError::invalid_data(
                        source_id,
                        format!("line {}: nested tables are not supported", idx0 + 1),
                    ));
                }
                builder = Some(TableBuilder {
                    id: id_attr(attrs),
                    ..Default::default()
                });
                continue;
            }

            let Some(table) = builder.as_mut() else {
                continue;
            };

            if line.starts_with("|}") {
                if let Some(done) = builder.take() {
                    tables.push(done.finish());
                }
            } else if let Some(caption) = line.strip_prefix("|+") {
                table.caption = Some(cell_value(caption));
            } else if line.starts_with("|-") {
                table.end_row();
            } else if let Some(cells) = line.strip_prefix('!') {
                let cells = split_cells(cells, &["!!", "||"]);
                if table.rows.is_empty() && table.current.is_empty() {
                    table.headers.extend(cells);
                } else {
                    table.current.extend(cells);
                }
            } else if let Some(cells) = line.strip_prefix('|') {
                table.current.extend(split_cells(cells, &["||"]));
            } else if !line.is_empty() {
                // Continuation of the previous cell.
                if let Some(last) = table.current.last_mut() {
                    last.push('\n');
                    last.push_str(line);
                }
            }
        }

        if builder.is_some() {
            return Err(LoadError::invalid_data(source_id, "unterminated table (missing '|}')"));
        }
        if tables.is_empty() {
            return Err(LoadError::invalid_data(source_id, "mediawiki table not found"));
        }
        Ok(tables)
    }
}

impl FormatAdapter for MediaWikiAdapter {
    fn format_name(&self) -> &'static str {
        "mediawiki"
    }

    fn default_template(&self, source_type: SourceType) -> &'static str {
        keyed_template(source_type)
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        let text = source.read_text()?;
        self.parse_text(&source.id(), &text)
    }
}

fn id_attr(attrs: &str) -> Option<String> {
    ID_ATTR_RE.captures(attrs).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
    })
}

fn split_cells(line: &str, separators: &[&str]) -> Vec<String> {
    let mut cells = vec![line.to_string()];
    for sep in separators {
        cells = cells
            .iter()
            .flat_map(|c| c.split(sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    cells.iter().map(|c| cell_value(c)).collect()
}

/// Drop a leading `attr="..." |` section and trim.
fn cell_value(cell: &str) -> String {
    match cell.split_once('|') {
        Some((attrs, value)) if attrs.contains('=') => value.trim().to_string(),
        _ => cell.trim().to_string(),
    }
}

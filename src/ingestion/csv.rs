//! Delimited text: CSV, TSV and whitespace-separated values.
//!
//! Rules:
//!
//! - Without explicit headers, the first record is the header row and at least one data row
//!   must follow.
//! - With explicit headers ([`FormatOptions::headers`]), every record is data.
//! - SSV collapses runs of whitespace into one separator, so column-aligned text (`ps`, `df`)
//!   loads as expected.
//! - Real-looking text keeps its original form by default ([`RealPolicy::PreserveText`]).

use crate::error::{LoadError, LoadResult};
use crate::normalize::{RawRow, RealPolicy};

use super::adapter::{delimited_template, FormatAdapter, FormatOptions, RawTable};
use super::source::{Source, SourceType};

/// Which delimited dialect an adapter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimited {
    /// Comma-separated.
    Csv,
    /// Tab-separated.
    Tsv,
    /// Whitespace-separated.
    Ssv,
}

impl Delimited {
    fn format_name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Ssv => "ssv",
        }
    }

    fn default_delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
            Self::Ssv => b' ',
        }
    }
}

/// Adapter for CSV-like formats.
#[derive(Debug, Clone)]
pub struct CsvAdapter {
    dialect: Delimited,
    options: FormatOptions,
}

impl CsvAdapter {
    /// Create an adapter for `dialect`.
    pub fn new(dialect: Delimited, options: FormatOptions) -> Self {
        Self { dialect, options }
    }

    fn delimiter(&self) -> u8 {
        self.options
            .delimiter
            .unwrap_or_else(|| self.dialect.default_delimiter())
    }

    /// Parse delimited text into a header row and data records.
    pub fn parse_text(&self, source_id: &str, text: &str) -> LoadResult<RawTable> {
        let collapsed;
        let input = if self.dialect == Delimited::Ssv {
            collapsed = collapse_whitespace(text);
            collapsed.as_str()
        } else {
            text
        };

        let mut rdr = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter())
            .quote(self.options.quote_char)
            .double_quote(true)
            .flexible(true)
            .from_reader(input.as_bytes());

        let mut records: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
                continue;
            }
            records.push(record.iter().map(str::to_string).collect());
        }

        let (headers, data) = if self.options.headers.is_empty() {
            if records.len() < 2 {
                return Err(LoadError::invalid_data(
                    source_id,
                    format!(
                        "{} needs a header row and at least one data row (found {} row(s))",
                        self.dialect.format_name(),
                        records.len()
                    ),
                ));
            }
            let mut iter = records.into_iter();
            let headers = iter.next().unwrap_or_default();
            (headers, iter.collect::<Vec<_>>())
        } else {
            if records.is_empty() {
                return Err(LoadError::invalid_data(
                    source_id,
                    format!("{} has no data rows", self.dialect.format_name()),
                ));
            }
            (self.options.headers.clone(), records)
        };

        let rows = data.into_iter().map(RawRow::sequence).collect();
        Ok(RawTable::new(headers, rows))
    }
}

impl FormatAdapter for CsvAdapter {
    fn format_name(&self) -> &'static str {
        self.dialect.format_name()
    }

    fn default_template(&self, source_type: SourceType) -> &'static str {
        delimited_template(source_type)
    }

    fn real_policy(&self) -> RealPolicy {
        RealPolicy::PreserveText
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        let text = source.read_text()?;
        Ok(vec![self.parse_text(&source.id(), &text)?])
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

//! The contract between the loader and format-specific parsers.

use crate::error::LoadResult;
use crate::normalize::{RawRow, RealPolicy};

use super::source::{Source, SourceKind, SourceType};

/// A table as discovered by an adapter, before normalization and naming.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Header row. Empty means positional access only.
    pub headers: Vec<String>,
    /// Records in source order.
    pub rows: Vec<RawRow>,
    /// Value for `%(key)s`. `None` falls back to `<format_name><format_id>`.
    pub key: Option<String>,
    /// Value for `%(title)s`.
    pub title: Option<String>,
    /// Value for `%(sheet)s`.
    pub sheet: Option<String>,
    /// Name used instead of the default template (the caller's explicit template still wins).
    pub name_override: Option<String>,
    /// Set when the adapter found a table it cannot interpret. The loader fails or skips it
    /// according to the adapter's [`FailurePolicy`].
    pub skip_reason: Option<String>,
}

impl RawTable {
    /// A table with headers and rows and no naming extras.
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            headers,
            rows,
            ..Default::default()
        }
    }

    /// A table the adapter found but cannot read, e.g. a sheet without a header row.
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            skip_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Set the `%(key)s` value.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the `%(title)s` value.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the `%(sheet)s` value.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

/// What the loader does when one table of a multi-table source cannot be read, normalized or
/// named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole `load` call.
    Abort,
    /// Log and skip the offending table, keep emitting the rest.
    SkipTable,
}

/// Format-independent parser settings passed to adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Explicit headers. When set, delimited formats treat their first row as data.
    pub headers: Vec<String>,
    /// Field delimiter override for delimited formats.
    pub delimiter: Option<u8>,
    /// Quote character for delimited formats.
    pub quote_char: u8,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            delimiter: None,
            quote_char: b'"',
        }
    }
}

/// A format-specific parser: raw source in, raw tables out.
pub trait FormatAdapter: Send + Sync {
    /// Constant format name, e.g. `"csv"`.
    fn format_name(&self) -> &'static str;

    /// Whether the adapter reads text or needs a file on disk.
    fn source_kind(&self) -> SourceKind {
        SourceKind::Text
    }

    /// Default name template for the given source type.
    fn default_template(&self, source_type: SourceType) -> &'static str;

    /// How real-looking text is normalized by default.
    fn real_policy(&self) -> RealPolicy {
        RealPolicy::PreserveText
    }

    /// Partial-success policy for multi-table sources.
    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    /// Parse the whole source into raw tables, in traversal order.
    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>>;
}

/// `%(filename)s`
pub const FILENAME_TEMPLATE: &str = "%(filename)s";
/// `%(format_name)s%(format_id)s`
pub const FORMAT_ID_TEMPLATE: &str = "%(format_name)s%(format_id)s";
/// `%(filename)s_%(key)s`
pub const FILENAME_KEY_TEMPLATE: &str = "%(filename)s_%(key)s";
/// `%(key)s`
pub const KEY_TEMPLATE: &str = "%(key)s";
/// `%(sheet)s`
pub const SHEET_TEMPLATE: &str = "%(sheet)s";

/// Default template for single-table delimited formats.
pub(crate) fn delimited_template(source_type: SourceType) -> &'static str {
    match source_type {
        SourceType::File => FILENAME_TEMPLATE,
        SourceType::Text | SourceType::Url => FORMAT_ID_TEMPLATE,
    }
}

/// Default template for formats whose tables carry a key.
pub(crate) fn keyed_template(source_type: SourceType) -> &'static str {
    match source_type {
        SourceType::File => FILENAME_KEY_TEMPLATE,
        SourceType::Text | SourceType::Url => KEY_TEMPLATE,
    }
}

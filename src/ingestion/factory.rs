//! Format registry and loader construction.
//!
//! Each [`LoaderFactory`] flavor (file, text, url) owns two case-insensitive lookup tables:
//! file extension -> [`Format`] and format name -> [`Format`]. The tables are independent: some
//! format names (`ssv`, `mediawiki`) have no extension, and text sources have no extension
//! table at all.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use log::debug;

use crate::error::{LoadError, LoadResult};

use super::adapter::{FormatAdapter, FormatOptions};
use super::csv::{CsvAdapter, Delimited};
use super::html::HtmlAdapter;
use super::json::{JsonAdapter, JsonLinesAdapter};
use super::loader::TableLoader;
use super::ltsv::LtsvAdapter;
use super::markdown::MarkdownAdapter;
use super::mediawiki::MediaWikiAdapter;
use super::source::{url_path, validate_url, Source, SourceKind, SourceType};

/// Every format the crate can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// Whitespace-separated values.
    Ssv,
    /// JSON document (one or many tables).
    Json,
    /// Newline-delimited JSON objects.
    JsonLines,
    /// Labeled tab-separated values.
    Ltsv,
    /// Markdown pipe tables.
    Markdown,
    /// MediaWiki `{| ... |}` tables.
    MediaWiki,
    /// HTML `<table>` elements.
    Html,
    /// Spreadsheet workbooks (feature `excel`).
    Excel,
    /// SQLite databases (feature `sqlite`).
    Sqlite,
}

impl Format {
    /// All formats.
    pub const ALL: [Format; 11] = [
        Self::Csv,
        Self::Tsv,
        Self::Ssv,
        Self::Json,
        Self::JsonLines,
        Self::Ltsv,
        Self::Markdown,
        Self::MediaWiki,
        Self::Html,
        Self::Excel,
        Self::Sqlite,
    ];

    /// Canonical format name, as used in `%(format_name)s` and counter keys.
    pub fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Ssv => "ssv",
            Self::Json => "json",
            Self::JsonLines => "json_lines",
            Self::Ltsv => "ltsv",
            Self::Markdown => "markdown",
            Self::MediaWiki => "mediawiki",
            Self::Html => "html",
            Self::Excel => "excel",
            Self::Sqlite => "sqlite",
        }
    }

    /// Names accepted for this format (canonical name first).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::JsonLines => &["json_lines", "jsonl", "ldjson", "ndjson"],
            Self::Csv => &["csv"],
            Self::Tsv => &["tsv"],
            Self::Ssv => &["ssv"],
            Self::Json => &["json"],
            Self::Ltsv => &["ltsv"],
            Self::Markdown => &["markdown"],
            Self::MediaWiki => &["mediawiki"],
            Self::Html => &["html"],
            Self::Excel => &["excel"],
            Self::Sqlite => &["sqlite"],
        }
    }

    /// File extensions mapped to this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Csv => &["csv"],
            Self::Tsv => &["tsv"],
            Self::Ssv | Self::MediaWiki => &[],
            Self::Json => &["json"],
            Self::JsonLines => &["jsonl", "ldjson", "ndjson"],
            Self::Ltsv => &["ltsv"],
            Self::Markdown => &["md"],
            Self::Html => &["htm", "html"],
            Self::Excel => &["xlsx", "xls", "xlsm", "xlsb", "ods"],
            Self::Sqlite => &["sqlite", "sqlite3"],
        }
    }

    /// What the format's adapter reads.
    pub fn source_kind(self) -> SourceKind {
        match self {
            Self::Excel | Self::Sqlite => SourceKind::File,
            _ => SourceKind::Text,
        }
    }

    /// Build the adapter for this format.
    ///
    /// # Errors
    ///
    /// [`LoadError::FeatureDisabled`] for formats compiled out of this build.
    pub fn adapter(self, options: &FormatOptions) -> LoadResult<Box<dyn FormatAdapter>> {
        Ok(match self {
            Self::Csv => Box::new(CsvAdapter::new(Delimited::Csv, options.clone())),
            Self::Tsv => Box::new(CsvAdapter::new(Delimited::Tsv, options.clone())),
            Self::Ssv => Box::new(CsvAdapter::new(Delimited::Ssv, options.clone())),
            Self::Json => Box::new(JsonAdapter),
            Self::JsonLines => Box::new(JsonLinesAdapter),
            Self::Ltsv => Box::new(LtsvAdapter::new(options.headers.clone())),
            Self::Markdown => Box::new(MarkdownAdapter),
            Self::MediaWiki => Box::new(MediaWikiAdapter),
            Self::Html => Box::new(HtmlAdapter),
            Self::Excel => excel_adapter()?,
            Self::Sqlite => sqlite_adapter()?,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn excel_adapter() -> LoadResult<Box<dyn FormatAdapter>> {
    #[cfg(feature = "excel")]
    {
        Ok(Box::new(super::excel::ExcelAdapter))
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(LoadError::FeatureDisabled {
            format: "excel",
            feature: "excel",
        })
    }
}

fn sqlite_adapter() -> LoadResult<Box<dyn FormatAdapter>> {
    #[cfg(feature = "sqlite")]
    {
        Ok(Box::new(super::sqlite::SqliteAdapter))
    }

    #[cfg(not(feature = "sqlite"))]
    {
        Err(LoadError::FeatureDisabled {
            format: "sqlite",
            feature: "sqlite",
        })
    }
}

/// Resolves formats for one source type and builds [`TableLoader`]s.
#[derive(Debug, Clone)]
pub struct LoaderFactory {
    source_type: SourceType,
    by_extension: BTreeMap<String, Format>,
    by_name: BTreeMap<String, Format>,
}

impl LoaderFactory {
    fn build(source_type: SourceType) -> Self {
        let mut by_extension = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        for format in Format::ALL {
            let file_only = format.source_kind() == SourceKind::File;
            if source_type == SourceType::Text && file_only {
                continue;
            }
            if source_type != SourceType::Text {
                for ext in format.extensions() {
                    by_extension.insert(ext.to_ascii_lowercase(), format);
                }
            }
            for name in format.aliases() {
                by_name.insert(name.to_ascii_lowercase(), format);
            }
        }
        Self {
            source_type,
            by_extension,
            by_name,
        }
    }

    /// Factory for file sources.
    pub fn file() -> Self {
        Self::build(SourceType::File)
    }

    /// Factory for in-memory text sources. There is no extension table: a format name is
    /// always required.
    pub fn text() -> Self {
        Self::build(SourceType::Text)
    }

    /// Factory for URL sources.
    pub fn url() -> Self {
        Self::build(SourceType::Url)
    }

    /// The source type this factory serves.
    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        self.by_extension.keys().map(String::as_str).collect()
    }

    /// Registered format names, sorted.
    pub fn format_names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    /// Resolve a format from the extension of `path` (or of the URL path, for URL factories).
    ///
    /// # Errors
    ///
    /// - [`LoadError::InvalidPath`] if `path` is empty.
    /// - [`LoadError::LoaderNotFound`] listing every registered extension on a miss.
    pub fn resolve_by_extension(&self, path: &str) -> LoadResult<Format> {
        if path.trim().is_empty() {
            return Err(LoadError::InvalidPath {
                message: "path is empty".to_string(),
            });
        }

        let target = match self.source_type {
            SourceType::Url => url_path(path),
            _ => path,
        };
        let last_component = Path::new(target)
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = last_component
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        self.by_extension.get(&ext).copied().ok_or_else(|| {
            LoaderNotFoundMessage::extension(&ext, path, &self.extensions()).into()
        })
    }

    /// Resolve a format by name. `"auto"` resolves by the extension of `path` instead.
    ///
    /// # Errors
    ///
    /// [`LoadError::LoaderNotFound`] listing every registered name on a miss, or when `"auto"`
    /// is requested for a text source.
    pub fn resolve_by_format_name(&self, name: &str, path: Option<&str>) -> LoadResult<Format> {
        let key = name.trim().to_ascii_lowercase();
        if key == "auto" {
            return match (self.source_type, path) {
                (SourceType::Text, _) | (_, None) => Err(LoaderNotFoundMessage::auto_without_path(
                    self.source_type,
                    &self.format_names(),
                )
                .into()),
                (_, Some(path)) => self.resolve_by_extension(path),
            };
        }
        self.by_name
            .get(&key)
            .copied()
            .ok_or_else(|| LoaderNotFoundMessage::name(name, &self.format_names()).into())
    }

    /// Build a loader for a file. `format` of `None` or `"auto"` resolves by extension.
    pub fn create_from_path(
        &self,
        path: impl AsRef<Path>,
        format: Option<&str>,
        options: &FormatOptions,
    ) -> LoadResult<TableLoader> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy();
        let resolved = match format {
            Some(name) => self.resolve_by_format_name(name, Some(&path_str))?,
            None => self.resolve_by_extension(&path_str)?,
        };
        debug!("resolved {} -> {resolved}", path.display());
        Ok(TableLoader::new(
            Source::File(path.to_path_buf()),
            resolved.adapter(options)?,
        ))
    }

    /// Build a loader for in-memory text.
    pub fn create_from_text(
        &self,
        text: impl Into<String>,
        format: &str,
        options: &FormatOptions,
    ) -> LoadResult<TableLoader> {
        let resolved = self.resolve_by_format_name(format, None)?;
        Ok(TableLoader::new(
            Source::Text(text.into()),
            resolved.adapter(options)?,
        ))
    }

    /// Resolve the format for `url` without fetching anything.
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidUrl`] for unusable URLs, then the resolution errors above.
    pub fn resolve_url(&self, url: &str, format: Option<&str>) -> LoadResult<Format> {
        validate_url(url)?;
        match format {
            Some(name) => self.resolve_by_format_name(name, Some(url)),
            None => self.resolve_by_extension(url),
        }
    }
}

struct LoaderNotFoundMessage(String);

impl LoaderNotFoundMessage {
    fn extension(ext: &str, path: &str, acceptable: &[&str]) -> Self {
        Self(format!(
            "loader not found for extension '{ext}' (path '{path}'); acceptable extensions are: {}",
            acceptable.join(", ")
        ))
    }

    fn name(name: &str, acceptable: &[&str]) -> Self {
        Self(format!(
            "loader not found for format name '{name}'; acceptable format names are: {}",
            acceptable.join(", ")
        ))
    }

    fn auto_without_path(source_type: SourceType, acceptable: &[&str]) -> Self {
        Self(format!(
            "format 'auto' needs an extension, which {source_type} sources do not have; acceptable format names are: {}",
            acceptable.join(", ")
        ))
    }
}

impl From<LoaderNotFoundMessage> for LoadError {
    fn from(value: LoaderNotFoundMessage) -> Self {
        LoadError::LoaderNotFound { message: value.0 }
    }
}

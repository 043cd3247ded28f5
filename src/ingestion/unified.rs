//! Unified loading entrypoints.
//!
//! Most callers should use [`load_from_path`], which picks a format from the file extension
//! (or [`LoadOptions::format`]) and returns every table the file contains.
//!
//! - [`load_from_text`] loads in-memory text; the format name is mandatory.
//! - `load_from_url` (feature `url`) fetches an `http(s)` resource first.
//! - If a [`LoadObserver`] is provided, success/failure/alerts are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LoadResult;
use crate::naming::TableCounter;
use crate::normalize::RealPolicy;
use crate::sanitize::{self, SanitizerProfile};
use crate::types::Table;

use super::adapter::FormatOptions;
use super::factory::LoaderFactory;
use super::loader::TableLoader;
use super::observability::{LoadObserver, LoadSeverity};
use super::source::Source;

/// HTTP settings for URL sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Proxy URL applied to every scheme.
    pub proxy: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Options controlling unified loading.
///
/// Use [`Default`] for common cases and struct update syntax for the rest.
#[derive(Clone)]
pub struct LoadOptions {
    /// Format name. `None` or `"auto"` picks the format from the extension.
    pub format: Option<String>,
    /// Table name template. `None` uses the format's default.
    pub table_name: Option<String>,
    /// Explicit headers for delimited and LTSV formats. When set, the first row is data.
    pub headers: Vec<String>,
    /// Field delimiter override for delimited formats.
    pub delimiter: Option<u8>,
    /// Quote character for delimited formats.
    pub quote_char: u8,
    /// Override the format's default [`RealPolicy`].
    pub real_policy: Option<RealPolicy>,
    /// Characters trimmed from text cells before type inference.
    pub strip_chars: String,
    /// Profile applied to table names and headers.
    pub sanitizer: Arc<dyn SanitizerProfile>,
    /// Counter used for `%(format_id)s` and `%(global_id)s`.
    pub counter: Arc<TableCounter>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
    /// HTTP settings, used by URL sources only.
    pub http: HttpOptions,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("table_name", &self.table_name)
            .field("headers", &self.headers)
            .field("delimiter", &self.delimiter)
            .field("quote_char", &self.quote_char)
            .field("real_policy", &self.real_policy)
            .field("strip_chars", &self.strip_chars)
            .field("sanitizer", &self.sanitizer)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("http", &self.http)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            table_name: None,
            headers: Vec::new(),
            delimiter: None,
            quote_char: b'"',
            real_policy: None,
            strip_chars: String::new(),
            sanitizer: sanitize::default_profile(),
            counter: TableCounter::global(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
            http: HttpOptions::default(),
        }
    }
}

impl LoadOptions {
    fn format_options(&self) -> FormatOptions {
        FormatOptions {
            headers: self.headers.clone(),
            delimiter: self.delimiter,
            quote_char: self.quote_char,
        }
    }

    /// Apply the loader-level settings to a freshly built loader.
    fn configure(&self, loader: TableLoader) -> TableLoader {
        let mut loader = loader
            .with_counter(Arc::clone(&self.counter))
            .with_sanitizer(Arc::clone(&self.sanitizer))
            .with_alert_threshold(self.alert_at_or_above)
            .with_strip_chars(self.strip_chars.clone());
        if let Some(policy) = self.real_policy {
            loader = loader.with_real_policy(policy);
        }
        if let Some(observer) = self.observer.as_ref() {
            loader = loader.with_observer(Arc::clone(observer));
        }
        if let Some(template) = self.table_name.as_ref() {
            loader.set_table_name_template(template.clone());
        }
        loader
    }
}

/// Load every table from a file.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with table and row counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// Format resolution errors happen before a loader exists and are not reported.
///
/// # Examples
///
/// ## CSV (auto-detect by extension)
///
/// ```no_run
/// use tabload::ingestion::{load_from_path, LoadOptions};
///
/// # fn main() -> Result<(), tabload::LoadError> {
/// // Uses `.csv` to select the CSV loader; the table is named after the file stem.
/// let tables = load_from_path("people.csv", &LoadOptions::default())?;
/// println!("{} rows", tables[0].row_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Force a format and a name template
///
/// ```no_run
/// use tabload::ingestion::{load_from_path, LoadOptions};
///
/// # fn main() -> Result<(), tabload::LoadError> {
/// let opts = LoadOptions {
///     format: Some("tsv".to_string()),
///     table_name: Some("%(filename)s_%(format_id)s".to_string()),
///     ..Default::default()
/// };
/// let tables = load_from_path("export.dat", &opts)?;
/// # let _ = tables;
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (log facade + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use tabload::ingestion::{load_from_path, LoadOptions, LoadSeverity, LogObserver};
///
/// let opts = LoadOptions {
///     observer: Some(Arc::new(LogObserver)),
///     alert_at_or_above: LoadSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are Critical and trigger `on_alert` at this threshold.
/// let _err = load_from_path("does_not_exist.csv", &opts).unwrap_err();
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<Vec<Table>> {
    let loader = LoaderFactory::file().create_from_path(
        path,
        options.format.as_deref(),
        &options.format_options(),
    )?;
    options.configure(loader).load()
}

/// Load every table from in-memory text in the named format.
///
/// ```
/// use std::sync::Arc;
///
/// use tabload::ingestion::{load_from_text, LoadOptions};
/// use tabload::naming::TableCounter;
///
/// # fn main() -> Result<(), tabload::LoadError> {
/// let opts = LoadOptions {
///     counter: Arc::new(TableCounter::new()),
///     ..Default::default()
/// };
/// let tables = load_from_text("a,b\n1,2\n", "csv", &opts)?;
/// assert_eq!(tables[0].name, "csv0");
/// # Ok(())
/// # }
/// ```
pub fn load_from_text(
    text: impl Into<String>,
    format: &str,
    options: &LoadOptions,
) -> LoadResult<Vec<Table>> {
    let loader =
        LoaderFactory::text().create_from_text(text, format, &options.format_options())?;
    options.configure(loader).load()
}

/// Fetch `url` and load every table from the response.
///
/// `options.format` of `None` or `"auto"` picks the format from the URL path extension.
#[cfg(feature = "url")]
pub fn load_from_url(url: &str, options: &LoadOptions) -> LoadResult<Vec<Table>> {
    let loader = LoaderFactory::url().create_from_url(
        url,
        options.format.as_deref(),
        &options.format_options(),
        &options.http,
    )?;
    options.configure(loader).load()
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue loading work in a job system.
#[derive(Clone)]
pub struct LoadRequest {
    /// What to load.
    pub source: Source,
    /// Options controlling loading. Text sources take their format from `options.format`.
    pub options: LoadOptions,
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("source", &self.source.id())
            .field("options", &self.options)
            .finish()
    }
}

impl LoadRequest {
    /// Execute the request with the entrypoint matching its source.
    ///
    /// # Errors
    ///
    /// Text sources without `options.format` fail with [`crate::LoadError::LoaderNotFound`].
    pub fn run(&self) -> LoadResult<Vec<Table>> {
        match &self.source {
            Source::File(path) => load_from_path(path, &self.options),
            Source::Text(text) => {
                let format = self.options.format.as_deref().unwrap_or("auto");
                load_from_text(text.clone(), format, &self.options)
            }
            Source::Url(url) => self.run_url(url),
        }
    }

    #[cfg(feature = "url")]
    fn run_url(&self, url: &str) -> LoadResult<Vec<Table>> {
        load_from_url(url, &self.options)
    }

    #[cfg(not(feature = "url"))]
    fn run_url(&self, _url: &str) -> LoadResult<Vec<Table>> {
        Err(crate::error::LoadError::FeatureDisabled {
            format: "url",
            feature: "url",
        })
    }
}

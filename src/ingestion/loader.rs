//! The loading state machine shared by every format.
//!
//! `load` runs: validate source -> adapter parse -> normalize -> expand name template ->
//! sanitize -> commit ids -> emit. Ids are committed only for tables that are actually emitted,
//! in source traversal order; a table skipped under [`FailurePolicy::SkipTable`] leaves no gap.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::{LoadError, LoadResult};
use crate::naming::{expand_table_name, NameContext, TableCounter, TemplateToken};
use crate::normalize::{RealPolicy, ValueNormalizer};
use crate::sanitize::{self, SanitizerProfile};
use crate::types::Table;

use super::adapter::{FailurePolicy, FormatAdapter, RawTable};
use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};
use super::source::{Source, SourceType};

/// Loads tables from one source with one format adapter.
pub struct TableLoader {
    source: Source,
    source_type: SourceType,
    filename: String,
    adapter: Box<dyn FormatAdapter>,
    table_name: Option<String>,
    real_policy: Option<RealPolicy>,
    strip_chars: String,
    counter: Arc<TableCounter>,
    sanitizer: Arc<dyn SanitizerProfile>,
    observer: Option<Arc<dyn LoadObserver>>,
    alert_at_or_above: LoadSeverity,
    #[cfg(feature = "url")]
    _staged: Option<tempfile::TempPath>,
}

impl fmt::Debug for TableLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableLoader")
            .field("source", &self.source.id())
            .field("source_type", &self.source_type)
            .field("format", &self.adapter.format_name())
            .field("table_name", &self.table_name)
            .field("sanitizer", &self.sanitizer)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl TableLoader {
    /// Create a loader using the process-wide counter and the permissive sanitizer.
    pub fn new(source: Source, adapter: Box<dyn FormatAdapter>) -> Self {
        let source_type = source.source_type();
        let filename = source.filename();
        Self {
            source,
            source_type,
            filename,
            adapter,
            table_name: None,
            real_policy: None,
            strip_chars: String::new(),
            counter: TableCounter::global(),
            sanitizer: sanitize::default_profile(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
            #[cfg(feature = "url")]
            _staged: None,
        }
    }

    /// Use `counter` for `%(format_id)s` / `%(global_id)s` numbering.
    pub fn with_counter(mut self, counter: Arc<TableCounter>) -> Self {
        self.counter = counter;
        self
    }

    /// Use `profile` to sanitize table names and headers.
    pub fn with_sanitizer(mut self, profile: Arc<dyn SanitizerProfile>) -> Self {
        self.sanitizer = profile;
        self
    }

    /// Report outcomes to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity at which failures are also sent to [`LoadObserver::on_alert`].
    pub fn with_alert_threshold(mut self, severity: LoadSeverity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    /// Override the adapter's default [`RealPolicy`].
    pub fn with_real_policy(mut self, policy: RealPolicy) -> Self {
        self.real_policy = Some(policy);
        self
    }

    /// Characters trimmed from text cells before type inference.
    pub fn with_strip_chars(mut self, strip_chars: impl Into<String>) -> Self {
        self.strip_chars = strip_chars.into();
        self
    }

    /// Report the loader as reading from a URL whose content was staged into `source`.
    #[cfg(feature = "url")]
    pub(crate) fn staged_from_url(mut self, url: &str) -> Self {
        self.source_type = SourceType::Url;
        self.filename = Source::Url(url.to_string()).filename();
        self
    }

    #[cfg(feature = "url")]
    pub(crate) fn keep_staged_file(mut self, path: tempfile::TempPath) -> Self {
        self._staged = Some(path);
        self
    }

    /// The adapter's format name.
    pub fn format_name(&self) -> &'static str {
        self.adapter.format_name()
    }

    /// The source type this loader was built for.
    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// The source being loaded (for URL loaders, the staged copy).
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Set the table name template used for every emitted table.
    pub fn set_table_name_template(&mut self, pattern: impl Into<String>) {
        self.table_name = Some(pattern.into());
    }

    /// The template in effect: the caller's, or the adapter's default.
    pub fn table_name_template(&self) -> &str {
        self.table_name
            .as_deref()
            .unwrap_or_else(|| self.default_template())
    }

    fn default_template(&self) -> &'static str {
        self.adapter.default_template(self.source_type)
    }

    /// Tables emitted (any format) since the counter was last reset.
    pub fn table_count_since_reset(&self) -> usize {
        self.counter.current_global_count()
    }

    /// Reset the counter this loader numbers tables with.
    pub fn clear_table_count(&self) {
        self.counter.reset()
    }

    /// Load every table from the source.
    ///
    /// Each call re-reads the source and issues fresh ids, so a second call names tables
    /// differently when the template uses `%(format_id)s` or `%(global_id)s`.
    ///
    /// # Errors
    ///
    /// Any [`crate::LoadError`]; see the adapter's [`FailurePolicy`] for partial failures.
    pub fn load(&self) -> LoadResult<Vec<Table>> {
        let ctx = LoadContext {
            source: self.source.id(),
            source_type: self.source_type,
            format: self.format_name().to_string(),
        };

        let result = self.load_inner();

        if let Some(obs) = self.observer.as_ref() {
            match &result {
                Ok((tables, skipped)) => obs.on_success(
                    &ctx,
                    LoadStats {
                        tables: tables.len(),
                        rows: tables.iter().map(Table::row_count).sum(),
                        skipped: *skipped,
                    },
                ),
                Err(e) => {
                    let sev = LoadSeverity::of(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result.map(|(tables, _)| tables)
    }

    fn load_inner(&self) -> LoadResult<(Vec<Table>, usize)> {
        self.source.validate()?;

        let format = self.format_name();
        let source_id = self.source.id();
        let raw_tables = self.adapter.parse(&self.source)?;
        debug!(
            "{format}: parsed {} raw table(s) from {source_id}",
            raw_tables.len()
        );

        let normalizer = ValueNormalizer::new(self.real_policy.unwrap_or(self.adapter.real_policy()))
            .with_strip_chars(self.strip_chars.clone());

        let mut tables = Vec::with_capacity(raw_tables.len());
        let mut skipped = 0;
        for raw in raw_tables {
            match self.emit(&normalizer, &source_id, raw) {
                Ok(table) => tables.push(table),
                Err(e) if self.adapter.failure_policy() == FailurePolicy::SkipTable => {
                    warn!("{format}: skipping table from {source_id}: {e}");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok((tables, skipped))
    }

    fn emit(&self, normalizer: &ValueNormalizer, source_id: &str, raw: RawTable) -> LoadResult<Table> {
        let RawTable {
            headers,
            rows,
            key,
            title,
            sheet,
            name_override,
            skip_reason,
        } = raw;

        if let Some(reason) = skip_reason {
            return Err(LoadError::invalid_data(source_id, reason));
        }

        let rows = normalizer.normalize_rows(source_id, &headers, rows)?;

        let format = self.format_name();
        let (ids, name, headers) = self.counter.issue_with(format, |ids| {
            let key = key.unwrap_or_else(|| format!("{format}{}", ids.format_id));
            let mut ctx = NameContext::new(self.default_template())
                .with(TemplateToken::Filename, self.filename.as_str())
                .with(TemplateToken::FormatName, format)
                .with(TemplateToken::FormatId, ids.format_id.to_string())
                .with(TemplateToken::GlobalId, ids.global_id.to_string())
                .with(TemplateToken::Key, key);
            if let Some(title) = title {
                ctx.set(TemplateToken::Title, title);
            }
            if let Some(sheet) = sheet {
                ctx.set(TemplateToken::Sheet, sheet);
            }

            let name = match (&self.table_name, name_override.filter(|n| !n.is_empty())) {
                (None, Some(name)) => name,
                (pattern, _) => expand_table_name(
                    pattern.as_deref().unwrap_or_else(|| self.default_template()),
                    &ctx,
                )?,
            };
            let (name, headers) = sanitize::sanitize(self.sanitizer.as_ref(), &name, &headers)?;
            Ok::<_, LoadError>((ids, name, headers))
        })?;

        debug!(
            "{format}: emit table '{name}' (format_id={}, global_id={}, rows={})",
            ids.format_id,
            ids.global_id,
            rows.len()
        );
        Ok(Table::new(name, headers, rows))
    }
}

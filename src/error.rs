use thiserror::Error;

/// Convenience result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error type returned by table loading.
///
/// One enum is shared by every format so callers can branch on the kind of failure without
/// knowing which adapter produced it.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source path is missing or empty.
    #[error("invalid path: {message}")]
    InvalidPath { message: String },

    /// The source path does not point at a readable regular file.
    #[error("invalid file path '{path}': {message}")]
    InvalidFilePath { path: String, message: String },

    /// The URL is empty or uses an unsupported scheme.
    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The source holds no data (empty or whitespace-only).
    #[error("empty data: {source_id}")]
    EmptyData { source_id: String },

    /// No loader is registered for the requested extension or format name.
    #[error("{message}")]
    LoaderNotFound { message: String },

    /// The content parsed but does not have the structure the format requires.
    #[error("invalid data in {source_id}: {message}")]
    InvalidData { source_id: String, message: String },

    /// The content does not match any accepted document shape.
    #[error("validation failed for {source_id}: {message}")]
    Validation { source_id: String, message: String },

    /// The table name template is unusable before substitution.
    #[error("invalid table name template: {message}")]
    InvalidName { message: String },

    /// Template substitution produced an empty table name.
    #[error("table name template '{template}' expanded to an empty name")]
    EmptyName { template: String },

    /// The table name is still invalid after sanitization.
    #[error("invalid table name '{name}': {message}")]
    InvalidTableName { name: String, message: String },

    /// A header is still invalid after sanitization.
    #[error("invalid header name '{name}': {message}")]
    InvalidHeaderName { name: String, message: String },

    /// The server answered a URL fetch with a non-success status.
    #[error("http error fetching '{url}': {message}")]
    Http { url: String, message: String },

    /// The configured proxy could not be used.
    #[error("proxy error '{proxy}': {message}")]
    Proxy { proxy: String, message: String },

    /// A file exists but its container format could not be opened.
    #[error("failed to open '{path}': {message}")]
    Open { path: String, message: String },

    /// The format is known but its support was not compiled in.
    #[error("{format} loading not enabled (enable cargo feature '{feature}')")]
    FeatureDisabled {
        format: &'static str,
        feature: &'static str,
    },

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON syntax error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    /// SQLite error (feature-gated behind `sqlite`).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl LoadError {
    pub(crate) fn invalid_data(source_id: &str, message: impl Into<String>) -> Self {
        Self::InvalidData {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn validation(source_id: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            source_id: source_id.to_string(),
            message: message.into(),
        }
    }
}

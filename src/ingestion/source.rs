//! Data sources and their validation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};

/// Where a loader reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// A file on disk.
    File,
    /// An in-memory string.
    Text,
    /// A remote `http(s)` resource.
    Url,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Text => "text",
            Self::Url => "url",
        })
    }
}

/// What an adapter needs to read: decoded text, or a file path handed to a container library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Text formats (CSV, JSON, HTML, ...). File sources are read into memory first.
    Text,
    /// Container formats (workbooks, databases) that must be opened from disk.
    File,
}

/// A concrete data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Path to a file.
    File(PathBuf),
    /// In-memory text.
    Text(String),
    /// `http` or `https` URL.
    Url(String),
}

impl Source {
    /// The source type tag.
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::File(_) => SourceType::File,
            Self::Text(_) => SourceType::Text,
            Self::Url(_) => SourceType::Url,
        }
    }

    /// A short identifier used in error messages and logs.
    pub fn id(&self) -> String {
        match self {
            Self::File(p) => p.display().to_string(),
            Self::Text(_) => "<text>".to_string(),
            Self::Url(u) => u.clone(),
        }
    }

    /// File stem for file sources, URL path stem for URL sources, empty for text.
    pub fn filename(&self) -> String {
        match self {
            Self::File(p) => p
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Text(_) => String::new(),
            Self::Url(u) => {
                let path = url_path(u);
                let last = path.rsplit('/').next().unwrap_or("");
                Path::new(last)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
        }
    }

    /// Check that the source is usable before any parsing.
    ///
    /// # Errors
    ///
    /// - [`LoadError::InvalidPath`] for an empty path.
    /// - [`LoadError::InvalidFilePath`] when the path is not an existing regular file.
    /// - [`LoadError::EmptyData`] for empty or whitespace-only text.
    /// - [`LoadError::InvalidUrl`] for an empty URL or a non-`http(s)` scheme.
    pub fn validate(&self) -> LoadResult<()> {
        match self {
            Self::File(p) => validate_file_path(p),
            Self::Text(t) => {
                if t.trim().is_empty() {
                    Err(LoadError::EmptyData {
                        source_id: self.id(),
                    })
                } else {
                    Ok(())
                }
            }
            Self::Url(u) => validate_url(u),
        }
    }

    /// Read the source as text: the file contents, or the in-memory string.
    ///
    /// # Errors
    ///
    /// [`LoadError::EmptyData`] when the content is whitespace-only, or an I/O error.
    pub fn read_text(&self) -> LoadResult<String> {
        let text = match self {
            Self::File(p) => fs::read_to_string(p)?,
            Self::Text(t) => t.clone(),
            Self::Url(u) => {
                return Err(LoadError::InvalidUrl {
                    url: u.clone(),
                    message: "url sources must be fetched before reading".to_string(),
                });
            }
        };
        if text.trim().is_empty() {
            return Err(LoadError::EmptyData {
                source_id: self.id(),
            });
        }
        Ok(text)
    }

    /// The path of a file source.
    ///
    /// # Errors
    ///
    /// [`LoadError::InvalidFilePath`] for text and URL sources.
    pub fn file_path(&self) -> LoadResult<&Path> {
        match self {
            Self::File(p) => Ok(p.as_path()),
            other => Err(LoadError::InvalidFilePath {
                path: other.id(),
                message: "format requires a file source".to_string(),
            }),
        }
    }
}

pub(crate) fn validate_file_path(path: &Path) -> LoadResult<()> {
    if path.as_os_str().is_empty() {
        return Err(LoadError::InvalidPath {
            message: "file path is empty".to_string(),
        });
    }
    if !path.exists() {
        return Err(LoadError::InvalidFilePath {
            path: path.display().to_string(),
            message: "file not found".to_string(),
        });
    }
    if !path.is_file() {
        return Err(LoadError::InvalidFilePath {
            path: path.display().to_string(),
            message: "not a regular file".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_url(url: &str) -> LoadResult<()> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(LoadError::InvalidUrl {
            url: url.to_string(),
            message: "url is empty".to_string(),
        });
    }
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return Err(LoadError::InvalidUrl {
            url: url.to_string(),
            message: "url has no scheme".to_string(),
        });
    };
    if !(scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")) {
        return Err(LoadError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme '{scheme}' (expected http or https)"),
        });
    }
    if rest.is_empty() || rest.starts_with('/') {
        return Err(LoadError::InvalidUrl {
            url: url.to_string(),
            message: "url has no host".to_string(),
        });
    }
    Ok(())
}

/// The path component of a URL, without scheme, host, query or fragment.
pub(crate) fn url_path(url: &str) -> &str {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let without_fragment = after_scheme.split('#').next().unwrap_or("");
    let without_query = without_fragment.split('?').next().unwrap_or("");
    without_query.find('/').map_or("", |idx| &without_query[idx..])
}

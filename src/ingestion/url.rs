#![cfg(feature = "url")]

//! URL sources.
//!
//! The format is resolved before any network I/O. The response body is then staged according
//! to what the resolved adapter reads: an in-memory string for text formats, a temporary file
//! for workbooks and databases. The temporary file lives as long as the returned loader.

use std::io::Write;

use log::debug;
use reqwest::blocking::Client;

use crate::error::{LoadError, LoadResult};

use super::adapter::FormatOptions;
use super::factory::LoaderFactory;
use super::loader::TableLoader;
use super::source::{Source, SourceKind};
use super::unified::HttpOptions;

impl LoaderFactory {
    /// Resolve, fetch and stage `url`, then build a loader for it.
    ///
    /// `format` of `None` or `"auto"` resolves by the extension of the URL path.
    ///
    /// # Errors
    ///
    /// Resolution errors first (no request is made), then [`LoadError::Proxy`],
    /// [`LoadError::Http`] or I/O errors from staging.
    pub fn create_from_url(
        &self,
        url: &str,
        format: Option<&str>,
        options: &FormatOptions,
        http: &HttpOptions,
    ) -> LoadResult<TableLoader> {
        let resolved = self.resolve_url(url, format)?;
        let adapter = resolved.adapter(options)?;
        let body = fetch(url, http)?;
        debug!("fetched {} byte(s) from {url} for {resolved}", body.len());

        match adapter.source_kind() {
            SourceKind::Text => {
                let text = String::from_utf8(body).map_err(|e| {
                    LoadError::invalid_data(url, format!("response is not valid utf-8: {e}"))
                })?;
                Ok(TableLoader::new(Source::Text(text), adapter).staged_from_url(url))
            }
            SourceKind::File => {
                let suffix = resolved
                    .extensions()
                    .first()
                    .map(|ext| format!(".{ext}"))
                    .unwrap_or_default();
                let mut file = tempfile::Builder::new()
                    .prefix("tabload-")
                    .suffix(&suffix)
                    .tempfile()?;
                file.write_all(&body)?;
                file.flush()?;
                let temp_path = file.into_temp_path();
                let source = Source::File(temp_path.to_path_buf());
                Ok(TableLoader::new(source, adapter)
                    .staged_from_url(url)
                    .keep_staged_file(temp_path))
            }
        }
    }
}

fn fetch(url: &str, http: &HttpOptions) -> LoadResult<Vec<u8>> {
    let mut builder = Client::builder().timeout(http.timeout);
    if let Some(proxy) = &http.proxy {
        let p = reqwest::Proxy::all(proxy.as_str()).map_err(|e| LoadError::Proxy {
            proxy: proxy.clone(),
            message: e.to_string(),
        })?;
        builder = builder.proxy(p);
    }
    let client = builder.build().map_err(|e| LoadError::Http {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let response = client.get(url).send().map_err(|e| match &http.proxy {
        Some(proxy) if e.is_connect() => LoadError::Proxy {
            proxy: proxy.clone(),
            message: e.to_string(),
        },
        _ => LoadError::Http {
            url: url.to_string(),
            message: e.to_string(),
        },
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Http {
            url: url.to_string(),
            message: format!("status {}", status.as_u16()),
        });
    }

    let bytes = response.bytes().map_err(|e| LoadError::Http {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(bytes.to_vec())
}

//! Loading entrypoints and format implementations.
//!
//! Most callers should use [`load_from_path`] / [`load_from_text`] (from [`unified`]) which:
//!
//! - resolve a format by extension or name through a [`LoaderFactory`]
//! - run a [`TableLoader`]: parse, normalize, name and sanitize every table
//! - optionally report success/failure/alerts to a [`LoadObserver`]
//!
//! Format adapters live in their own modules:
//! - [`csv`] (csv, tsv, ssv)
//! - [`json`] (json, json lines)
//! - [`ltsv`], [`markdown`], [`mediawiki`], [`html`]
//! - `excel` (feature `excel`), `sqlite` (feature `sqlite`)

pub mod adapter;
pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod factory;
pub mod html;
pub mod json;
pub mod loader;
pub mod ltsv;
pub mod markdown;
pub mod mediawiki;
pub mod observability;
pub mod source;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod unified;
#[cfg(feature = "url")]
pub mod url;

pub use adapter::{FailurePolicy, FormatAdapter, FormatOptions, RawTable};
pub use factory::{Format, LoaderFactory};
pub use loader::TableLoader;
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, LogObserver,
};
pub use source::{Source, SourceKind, SourceType};
#[cfg(feature = "url")]
pub use unified::load_from_url;
pub use unified::{load_from_path, load_from_text, HttpOptions, LoadOptions, LoadRequest};

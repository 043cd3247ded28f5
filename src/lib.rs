//! `tabload` loads tabular data from many textual and binary formats into named, normalized
//! in-memory [`types::Table`]s.
//!
//! The primary entrypoints are [`ingestion::load_from_path`] and [`ingestion::load_from_text`].
//! The path entrypoint picks the format from the file extension, or you can force one through
//! [`ingestion::LoadOptions::format`].
//!
//! ## What you can load
//!
//! | format      | extensions                               | notes                           |
//! |-------------|------------------------------------------|---------------------------------|
//! | csv         | `.csv`                                   |                                 |
//! | tsv         | `.tsv`                                   |                                 |
//! | ssv         | (by name only)                           | whitespace separated            |
//! | json        | `.json`                                  | one or many tables per document |
//! | json_lines  | `.jsonl`, `.ldjson`, `.ndjson`           |                                 |
//! | ltsv        | `.ltsv`                                  |                                 |
//! | markdown    | `.md`                                    |                                 |
//! | mediawiki   | (by name only)                           |                                 |
//! | html        | `.htm`, `.html`                          |                                 |
//! | excel       | `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`| Cargo feature `excel`           |
//! | sqlite      | `.sqlite`, `.sqlite3`                    | Cargo feature `sqlite`          |
//!
//! URL sources (`http`/`https`) need the Cargo feature `url`.
//!
//! **Values:** cells are normalized into [`types::Value`]: `Null`, `Integer`, `Real`
//! (exact decimal), `Float` (for values a decimal cannot hold) or `Text`. Missing cells are
//! `Null` and empty text stays `Text("")`; numeric-looking text becomes `Integer`, and
//! real-looking text becomes `Real` or stays `Text` depending on [`normalize::RealPolicy`].
//!
//! **Names:** every table is named from a template such as `%(filename)s_%(key)s`; see
//! [`naming`]. The result is passed through a [`sanitize::SanitizerProfile`].
//!
//! ## Quick example
//!
//! ```no_run
//! use tabload::ingestion::{load_from_path, LoadOptions};
//!
//! # fn main() -> Result<(), tabload::LoadError> {
//! // Auto-detects by extension (.csv/.json/.html/.xlsx/...).
//! for table in load_from_path("data.json", &LoadOptions::default())? {
//!     println!("{}: {} rows", table.name, table.row_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! In-memory text always names its format:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tabload::ingestion::{load_from_text, LoadOptions};
//! use tabload::naming::TableCounter;
//! use tabload::types::Value;
//!
//! let opts = LoadOptions {
//!     counter: Arc::new(TableCounter::new()),
//!     ..Default::default()
//! };
//! let tables = load_from_text(r#"[{"a":1},{"b":"x"}]"#, "json", &opts).unwrap();
//! assert_eq!(tables[0].headers, vec!["a", "b"]);
//! assert_eq!(tables[0].rows[0], vec![Value::Integer(1), Value::Null]);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: entrypoints, the format registry, the loader and format adapters
//! - [`naming`]: table name templates and counters
//! - [`normalize`]: raw cell and row normalization
//! - [`sanitize`]: table name and header sanitization profiles
//! - [`types`]: the [`types::Table`] and [`types::Value`] data model
//! - [`error`]: error types used across loading

pub mod error;
pub mod ingestion;
pub mod naming;
pub mod normalize;
pub mod sanitize;
pub mod types;

pub use error::{LoadError, LoadResult};
pub use ingestion::{load_from_path, load_from_text, LoadOptions};
pub use types::{Table, Value};

//! Table naming: templates and the emission counters they read.

pub mod counter;
pub mod template;

pub use counter::{TableCounter, TableIds};
pub use template::{expand_table_name, NameContext, TemplateToken};

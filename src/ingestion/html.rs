//! HTML tables.
//!
//! Every `<table>` in the document is emitted in document order. The header row is the first
//! row made only of `<th>` cells (usually inside `<thead>`); without one the table has no
//! headers. `%(key)s` is the table `id` attribute, and `%(title)s` is the page `<title>`, or the
//! table `<caption>` when the page has no title.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::{LoadError, LoadResult};
use crate::normalize::RawRow;

use super::adapter::{keyed_template, FormatAdapter, RawTable};
use super::source::{Source, SourceType};

static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static CAPTION: LazyLock<Selector> = LazyLock::new(|| selector("caption"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("th, td"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Adapter for HTML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlAdapter;

impl HtmlAdapter {
    /// Find every table in an HTML document.
    pub fn parse_text(&self, source_id: &str, text: &str) -> LoadResult<Vec<RawTable>> {
        let doc = Html::parse_document(text);
        let page_title = doc
            .select(&TITLE)
            .next()
            .map(|t| collapse(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let tables: Vec<RawTable> = doc
            .select(&TABLE)
            .map(|table| table_from_element(table, page_title.as_deref()))
            .collect();

        if tables.is_empty() {
            return Err(LoadError::invalid_data(source_id, "html table not found"));
        }
        Ok(tables)
    }
}

impl FormatAdapter for HtmlAdapter {
    fn format_name(&self) -> &'static str {
        "html"
    }

    fn default_template(&self, source_type: SourceType) -> &'static str {
        keyed_template(source_type)
    }

    fn parse(&self, source: &Source) -> LoadResult<Vec<RawTable>> {
        let text = source.read_text()?;
        self.parse_text(&source.id(), &text)
    }
}

fn table_from_element(table: ElementRef<'_>, page_title: Option<&str>) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<RawRow> = Vec::new();

    for tr in table.select(&ROW).filter(|tr| owning_table(*tr) == Some(table)) {
        let cells: Vec<ElementRef<'_>> = tr.select(&CELL).filter(|c| parent_row(*c) == Some(tr)).collect();
        if cells.is_empty() {
            continue;
        }
        let all_th = cells.iter().all(|c| c.value().name() == "th");
        let texts: Vec<String> = cells
            .iter()
            .map(|c| collapse(&c.text().collect::<String>()))
            .collect();

        if all_th && headers.is_empty() && rows.is_empty() {
            headers = texts;
        } else {
            rows.push(RawRow::sequence(texts));
        }
    }

    let caption = table
        .select(&CAPTION)
        .next()
        .map(|c| collapse(&c.text().collect::<String>()))
        .filter(|c| !c.is_empty());

    let mut raw = RawTable::new(headers, rows);
    raw.key = table
        .value()
        .attr("id")
        .map(str::to_string)
        .filter(|id| !id.is_empty());
    raw.title = page_title.map(str::to_string).or(caption);
    raw
}

/// Nearest `<table>` ancestor, so rows of nested tables are not attributed to the outer one.
fn owning_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

fn parent_row(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

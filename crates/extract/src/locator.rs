// ABOUTME: Locates the boon table inside a raw wiki page.
// ABOUTME: Two-strategy chain: marker class first, heading proximity second, else TableNotFound.

//! Table location.
//!
//! Key behaviors:
//! - Strategy (a): the first `<table>` whose class attribute contains the
//!   table marker wins.
//! - Strategy (b): the first heading whose text contains the heading marker,
//!   followed by a forward walk over its sibling elements until a `<table>`.
//! - Nothing else is guessed; a miss is `ExtractError::TableNotFound`.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

/// Markers describing how boon tables look on a source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableProfile {
    /// Substring searched for in a table's class attribute.
    pub table_class_marker: String,
    /// Heading tags considered by the proximity fallback.
    pub heading_tags: Vec<String>,
    /// Substring searched for in heading text.
    pub heading_marker: String,
    /// Class carried by the first cell of every data row.
    pub row_marker_class: String,
}

impl Default for TableProfile {
    fn default() -> Self {
        Self {
            table_class_marker: "boonTable".to_string(),
            heading_tags: vec!["h2".to_string()],
            heading_marker: "List".to_string(),
            row_marker_class: "boonTableName".to_string(),
        }
    }
}

/// Which strategy found the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    MarkerClass,
    HeadingProximity,
}

/// A table element found in a document.
#[derive(Debug, Clone, Copy)]
pub struct LocatedTable<'a> {
    pub element: ElementRef<'a>,
    pub strategy: LocateStrategy,
}

/// Finds the boon table in a parsed page.
pub fn locate_table<'a>(
    doc: &'a Html,
    profile: &TableProfile,
) -> Result<LocatedTable<'a>, ExtractError> {
    if let Some(element) = find_by_class(doc, &profile.table_class_marker) {
        return Ok(LocatedTable {
            element,
            strategy: LocateStrategy::MarkerClass,
        });
    }

    if let Some(element) = find_after_heading(doc, profile) {
        return Ok(LocatedTable {
            element,
            strategy: LocateStrategy::HeadingProximity,
        });
    }

    Err(ExtractError::TableNotFound)
}

/// Locates the boon table in a raw page and returns its outer HTML.
pub fn snapshot_page(html: &str, profile: &TableProfile) -> Result<String, ExtractError> {
    let doc = Html::parse_document(html);
    let located = locate_table(&doc, profile)?;
    Ok(located.element.html())
}

/// Returns the first table of a saved snapshot (a document holding one table).
pub fn snapshot_table(doc: &Html) -> Result<ElementRef<'_>, ExtractError> {
    doc.select(&TABLE_SELECTOR)
        .next()
        .ok_or(ExtractError::TableNotFound)
}

fn find_by_class<'a>(doc: &'a Html, marker: &str) -> Option<ElementRef<'a>> {
    if marker.is_empty() {
        return None;
    }
    doc.select(&TABLE_SELECTOR).find(|table| {
        table
            .value()
            .attr("class")
            .map(|class| class.contains(marker))
            .unwrap_or(false)
    })
}

fn find_after_heading<'a>(doc: &'a Html, profile: &TableProfile) -> Option<ElementRef<'a>> {
    if profile.heading_marker.is_empty() {
        return None;
    }

    for heading in doc.select(&HEADING_SELECTOR) {
        let tag = heading.value().name();
        if !profile.heading_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            continue;
        }
        let text: String = heading.text().collect();
        if !text.contains(&profile.heading_marker) {
            continue;
        }

        let table = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == "table");
        if table.is_some() {
            return table;
        }
    }

    None
}

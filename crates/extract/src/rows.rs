// ABOUTME: Row classification and field extraction for located boon tables.
// ABOUTME: Turns marked data rows into validated Records and reports skipped rows.

//! Row classification and field extraction.
//!
//! Key behaviors:
//! - Only rows owned by the table itself are considered; rows of tables
//!   nested inside cells are ignored.
//! - The first row is the header and is always skipped.
//! - A data row's first `<td>` carries the row marker class; unmarked rows are
//!   decorative and dropped without touching neighbouring rows.
//! - A data row with fewer than five cells is a `MalformedRow`; it is logged,
//!   reported in `Extraction::skipped`, and extraction carries on.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::html_utils::{collapse_whitespace, fragment_text};
use crate::locator::{locate_table, snapshot_table, TableProfile};
use crate::models::{Fields, Record};
use crate::slug::SlugAllocator;

/// Number of positional cells in a data row.
pub const EXPECTED_CELLS: usize = 5;

/// Name used when the first cell has no bolded text.
pub const UNKNOWN_NAME: &str = "Unknown";

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static NAME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("b, strong").unwrap());
static TIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Tier (\d+)").unwrap());

/// A row that could not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// Position of the row in the table, header included.
    pub row: usize,
    pub error: ExtractError,
}

/// The outcome of extracting one table.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub skipped: Vec<RowIssue>,
    /// Unmarked rows that were dropped as decoration.
    pub decorative: usize,
    /// Records whose name fell back to the placeholder.
    pub unknown_names: usize,
}

/// Computes the derived type label from the notes and rarity text.
///
/// A `Tier N` match in the notes sets `Tier N`; a rarity mentioning
/// `Legendary` or else `Duo` overrides it.
pub fn derive_type(notes_text: &str, rarity_text: &str) -> Option<String> {
    let mut derived = TIER_RE
        .captures(notes_text)
        .map(|caps| format!("Tier {}", &caps[1]));

    if rarity_text.contains("Legendary") {
        derived = Some("Legendary".to_string());
    } else if rarity_text.contains("Duo") {
        derived = Some("Duo".to_string());
    }

    derived
}

/// Locates the boon table in a raw page and extracts its records.
pub fn extract_page(
    html: &str,
    source: &str,
    profile: &TableProfile,
) -> Result<Extraction, ExtractError> {
    let doc = Html::parse_document(html);
    let located = locate_table(&doc, profile)?;
    Ok(extract_records(located.element, source, profile))
}

/// Extracts records from a saved table snapshot.
pub fn extract_snapshot(
    html: &str,
    source: &str,
    profile: &TableProfile,
) -> Result<Extraction, ExtractError> {
    let doc = Html::parse_document(html);
    let table = snapshot_table(&doc)?;
    Ok(extract_records(table, source, profile))
}

/// Extracts the ordered records of a located table.
pub fn extract_records(table: ElementRef<'_>, source: &str, profile: &TableProfile) -> Extraction {
    let mut out = Extraction::default();
    let mut slugs = SlugAllocator::new();

    for (row_idx, row) in owned_rows(table).enumerate().skip(1) {
        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| cell.value().name() == "td")
            .collect();

        let marked = cells
            .first()
            .map(|cell| {
                cell.value()
                    .classes()
                    .any(|class| class == profile.row_marker_class)
            })
            .unwrap_or(false);
        if !marked {
            out.decorative += 1;
            debug!(source, row = row_idx, "skipping decorative row");
            continue;
        }

        if cells.len() < EXPECTED_CELLS {
            let error = ExtractError::MalformedRow {
                row: row_idx,
                found: cells.len(),
            };
            warn!(source, row = row_idx, cells = cells.len(), "skipping malformed row");
            out.skipped.push(RowIssue { row: row_idx, error });
            continue;
        }

        let name = match extract_name(&cells[0]) {
            Some(name) => name,
            None => {
                warn!(
                    source,
                    row = row_idx,
                    "no bolded name in first cell, page layout may have changed"
                );
                out.unknown_names += 1;
                UNKNOWN_NAME.to_string()
            }
        };

        let fields = Fields {
            primary: cells[0].inner_html().trim().to_string(),
            description: cells[1].inner_html().trim().to_string(),
            rarity: cells[2].inner_html().trim().to_string(),
            notes: cells[3].inner_html().trim().to_string(),
            prerequisites: cells[4].inner_html().trim().to_string(),
        };
        let derived_type = derive_type(&fragment_text(&fields.notes), &fragment_text(&fields.rarity));
        let slug = slugs.allocate(&name);
        let order_index = out.records.len() as u32;

        match Record::new(source, order_index, name, slug, fields, derived_type) {
            Ok(record) => out.records.push(record),
            Err(error) => {
                warn!(source, row = row_idx, %error, "skipping invalid row");
                out.skipped.push(RowIssue { row: row_idx, error });
            }
        }
    }

    out
}

/// Rows whose nearest enclosing table is `table`.
fn owned_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let table_id = table.id();
    table.select(&ROW_SELECTOR).filter(move |row| {
        row.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "table")
            .map(|owner| owner.id() == table_id)
            .unwrap_or(false)
    })
}

fn extract_name(cell: &ElementRef<'_>) -> Option<String> {
    let bold = cell.select(&NAME_SELECTOR).next()?;
    let text = collapse_whitespace(&bold.text().collect::<String>());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ABOUTME: Read-side renderers: the combined HTML table and the front-end JSON rows.
// ABOUTME: Both keep source order and record order so repeated exports are byte-identical.

use serde::Serialize;

use crate::html_utils::{escape_text, summary_line};
use crate::models::Record;

/// Column headers of the combined table.
pub const COMBINED_HEADERS: [&str; 6] = ["God", "Boon", "Description", "Type", "Rarity", "Requires"];

/// One row of the JSON export, keyed the way the front end reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub id: u32,
    pub god: String,
    pub row_idx: u32,
    pub boon_name: String,
    pub slug: String,
    pub boon_html: String,
    pub description: String,
    pub rarity: String,
    pub notes: String,
    pub prerequisites: String,
    pub derived_type: Option<String>,
}

/// Builds export rows ordered by `(source, order_index)`.
///
/// `id` is the 1-based position in that order.
pub fn export_rows(records: &[Record]) -> Vec<ExportRow> {
    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.source()
            .cmp(b.source())
            .then(a.order_index().cmp(&b.order_index()))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(pos, record)| {
            let fields = record.fields();
            ExportRow {
                id: pos as u32 + 1,
                god: record.source().to_string(),
                row_idx: record.order_index(),
                boon_name: record.name().to_string(),
                slug: record.slug().to_string(),
                boon_html: fields.primary.clone(),
                description: fields.description.clone(),
                rarity: fields.rarity.clone(),
                notes: fields.notes.clone(),
                prerequisites: fields.prerequisites.clone(),
                derived_type: record.derived_type().map(str::to_string),
            }
        })
        .collect()
}

/// Renders every group into one `<table>`.
///
/// `groups` pairs a source label with that source's records; both the
/// group order and the record order inside a group are kept.
pub fn combine_html(groups: &[(String, Vec<Record>)]) -> String {
    let mut html = String::from("<table>\n<tr>");
    for header in COMBINED_HEADERS {
        html.push_str("<th>");
        html.push_str(header);
        html.push_str("</th>");
    }
    html.push_str("</tr>\n");

    for (label, records) in groups {
        for record in records {
            let fields = record.fields();
            let cells = [
                escape_text(label),
                fields.primary.clone(),
                escape_text(&summary_line(&fields.description)),
                escape_text(record.derived_type().unwrap_or("")),
                fields.rarity.clone(),
                fields.prerequisites.clone(),
            ];
            html.push_str("<tr>");
            for cell in cells {
                html.push_str("<td>");
                html.push_str(&cell);
                html.push_str("</td>");
            }
            html.push_str("</tr>\n");
        }
    }

    html.push_str("</table>\n");
    html
}

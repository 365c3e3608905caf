// ABOUTME: The query stage: prints stored boons, optionally filtered by a search term.
// ABOUTME: Fragments are shown as plain text; empty and "none" sections are omitted.

use std::io::Write;

use anyhow::Result;
use compendium_extract::{strip_html, Record};
use compendium_store::Store;

use crate::summary::StageSummary;

const SEPARATOR: &str = "--------------------------------------";

/// Writes one record block.
pub fn render_record(out: &mut impl Write, record: &Record) -> std::io::Result<()> {
    let fields = record.fields();
    writeln!(out, "[{}] {}", record.source().to_uppercase(), record.name())?;
    writeln!(out, "Description: {}", strip_html(&fields.description))?;

    let notes = strip_html(&fields.notes);
    if !notes.is_empty() {
        writeln!(out, "Notes: {}", notes)?;
    }
    let prerequisites = strip_html(&fields.prerequisites);
    if !prerequisites.is_empty() && !prerequisites.eq_ignore_ascii_case("none") {
        writeln!(out, "Prerequisites: {}", prerequisites)?;
    }
    writeln!(out, "{}", SEPARATOR)
}

/// Writes the full report for `records`.
pub fn render(out: &mut impl Write, records: &[Record]) -> std::io::Result<()> {
    writeln!(out, "Results:")?;
    writeln!(out, "{}", SEPARATOR)?;
    for record in records {
        render_record(out, record)?;
    }
    writeln!(out, "Found {} boons", records.len())
}

pub fn run(store: &Store, term: Option<&str>, out: &mut impl Write) -> Result<StageSummary> {
    let records = match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => store.search(term)?,
        None => store.list_by_name()?,
    };
    writeln!(out, "Querying boons database...")?;
    render(out, &records)?;

    let mut summary = StageSummary::new("query");
    summary.processed = records.len();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use compendium_extract::Fields;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_skips_empty_and_none_sections() {
        let fields = Fields {
            primary: "<b>Curse of Agony</b>".to_string(),
            description: "Your <b>Attack</b> inflicts <i>Doom</i>.".to_string(),
            rarity: "Common".to_string(),
            notes: String::new(),
            prerequisites: "<p>None</p>".to_string(),
        };
        let record = Record::new("ares", 0, "Curse of Agony", "curse_of_agony", fields, None).unwrap();

        let mut out = Vec::new();
        render(&mut out, &[record]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Results:\n\
             --------------------------------------\n\
             [ARES] Curse of Agony\n\
             Description: Your Attack inflicts Doom.\n\
             --------------------------------------\n\
             Found 1 boons\n"
        );
    }

    #[test]
    fn test_render_includes_notes_and_prerequisites() {
        let fields = Fields {
            primary: "<b>Sea Storm</b>".to_string(),
            description: "Knock-away also strikes.".to_string(),
            rarity: "Duo".to_string(),
            notes: "Stacks with Thunder Dash.".to_string(),
            prerequisites: "Tidal Dash".to_string(),
        };
        let record = Record::new("zeus", 3, "Sea Storm", "sea_storm", fields, None).unwrap();
        let mut out = Vec::new();
        render_record(&mut out, &record).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Notes: Stacks with Thunder Dash.\n"));
        assert!(text.contains("Prerequisites: Tidal Dash\n"));
    }
}

// ABOUTME: The export and combine stages: render stored records to JSON and to one HTML table.
// ABOUTME: Both are read-only on the store and overwrite their output file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use compendium_extract::{combine_html, export_rows, Record};
use compendium_store::Store;
use tracing::info;

use crate::settings::Settings;
use crate::summary::StageSummary;

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

/// Writes `public/data/boons.json`.
pub fn run_export(settings: &Settings, store: &Store) -> Result<StageSummary> {
    let records = store.list_ordered()?;
    let rows = export_rows(&records);
    let mut json = serde_json::to_string_pretty(&rows).context("serializing export rows")?;
    json.push('\n');

    let path = settings.export_path();
    write_output(&path, &json)?;
    info!(path = %path.display(), rows = rows.len(), "exported boons");

    let mut summary = StageSummary::new("export");
    summary.processed = records.len();
    summary.imported = rows.len();
    Ok(summary)
}

/// Writes `combined-boons.html`, grouped in configured source order.
pub fn run_combine(settings: &Settings, store: &Store) -> Result<StageSummary> {
    let mut groups: Vec<(String, Vec<Record>)> = Vec::new();
    let mut summary = StageSummary::new("combine");
    for source in &settings.sources {
        let records = store.list_source(&source.key())?;
        if records.is_empty() {
            summary.skipped += 1;
            continue;
        }
        summary.processed += records.len();
        groups.push((source.name.clone(), records));
    }

    let path = settings.combined_path();
    write_output(&path, &combine_html(&groups))?;
    summary.imported = summary.processed;
    info!(path = %path.display(), groups = groups.len(), "combined boons");
    Ok(summary)
}

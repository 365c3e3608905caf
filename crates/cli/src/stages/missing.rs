// ABOUTME: The missing stage: lists records whose primary cell has no image file on disk.
// ABOUTME: For each it prints the remote candidate URL, if any, that the images stage would try.

use std::io::Write;

use anyhow::Result;
use compendium_extract::{image_refs, Record};
use compendium_store::Store;

use crate::settings::Settings;
use crate::stages::existing_local_image;
use crate::summary::StageSummary;

/// Remote URL the record's first usable `<img>` points at.
fn remote_candidate(record: &Record) -> Option<String> {
    image_refs(&record.fields().primary)
        .into_iter()
        .find_map(|image| image.candidate())
}

/// Records without a local image, in `(source, order_index)` order.
pub fn missing_records(settings: &Settings, records: Vec<Record>) -> Vec<(Record, Option<String>)> {
    records
        .into_iter()
        .filter(|record| existing_local_image(settings, &record.fields().primary).is_none())
        .map(|record| {
            let candidate = remote_candidate(&record);
            (record, candidate)
        })
        .collect()
}

pub fn run(settings: &Settings, store: &Store, out: &mut impl Write) -> Result<StageSummary> {
    let records = store.list_ordered()?;
    let total = records.len();
    let missing = missing_records(settings, records);

    for (record, candidate) in &missing {
        match candidate {
            Some(url) => writeln!(out, "[{}] {}: {}", record.source().to_uppercase(), record.name(), url)?,
            None => writeln!(
                out,
                "[{}] {}: no valid image source",
                record.source().to_uppercase(),
                record.name()
            )?,
        }
    }
    writeln!(out, "{} of {} boons have no local image", missing.len(), total)?;

    let mut summary = StageSummary::new("missing");
    summary.processed = total;
    summary.skipped = missing.len();
    Ok(summary)
}

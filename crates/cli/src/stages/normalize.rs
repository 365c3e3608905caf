// ABOUTME: The normalize-icons stage: renames icon files to <source>_<slug>_icon.<ext>.
// ABOUTME: Stored fragments and asset rows are repointed at the new name in the same pass.

use std::fs;

use anyhow::{Context, Result};
use compendium_extract::icons::split_file_name;
use compendium_extract::image_utils::icon_local_path;
use compendium_extract::{icon_file_name, match_icon_file};
use compendium_store::Store;
use tracing::{debug, info, warn};

use crate::settings::Settings;
use crate::summary::StageSummary;

fn list_icon_files(settings: &Settings) -> Result<Vec<String>> {
    let dir = settings.icons_dir();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

pub fn run(settings: &Settings, store: &mut Store) -> Result<StageSummary> {
    let mut files = list_icon_files(settings)?;
    let records = store.list_ordered()?;
    let mut summary = StageSummary::new("normalize-icons");

    for record in &records {
        summary.processed += 1;
        let Some(current) = match_icon_file(&files, record.source(), record.slug(), record.name())
            .map(str::to_string)
        else {
            debug!(source = record.source(), slug = record.slug(), "no icon file matched");
            summary.skipped += 1;
            continue;
        };

        let (_, ext) = split_file_name(&current);
        let target = icon_file_name(record.source(), record.slug(), ext);
        if current == target {
            continue;
        }
        let target_path = settings.icons_dir().join(&target);
        if target_path.exists() {
            debug!(file = %current, target = %target, "normalized icon already present");
            summary.skipped += 1;
            continue;
        }

        if let Err(err) = fs::rename(settings.icons_dir().join(&current), &target_path) {
            warn!(file = %current, target = %target, error = %err, "could not rename icon");
            summary.skipped += 1;
            continue;
        }
        let touched = store.relocate_asset(&icon_local_path(&current), &icon_local_path(&target))?;
        info!(from = %current, to = %target, records = touched, "renamed icon");

        // The listing stays as read; a renamed file is simply gone from it.
        files.retain(|file| file != &current);
        summary.imported += 1;
    }

    Ok(summary)
}

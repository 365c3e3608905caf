// ABOUTME: The fetch stage: downloads each source page and saves its boon table as a snapshot.
// ABOUTME: Pages without a locatable table are saved whole for inspection and counted as skipped.

use std::fs;

use anyhow::{Context, Result};
use compendium_extract::{snapshot_page, source_url, ExtractError, Source};
use tracing::{info, warn};

use crate::settings::Settings;
use crate::summary::StageSummary;

pub async fn run(settings: &Settings) -> Result<StageSummary> {
    let client = settings.client()?;
    let boons_dir = settings.boons_dir();
    fs::create_dir_all(&boons_dir)
        .with_context(|| format!("creating {}", boons_dir.display()))?;

    let urls: Vec<String> = settings
        .sources
        .iter()
        .map(|source| source_url(&settings.url_template, source))
        .collect();
    let pages = client.fetch_pages(&urls, settings.concurrency).await;

    let mut summary = StageSummary::new("fetch");
    for ((source, url), page) in settings.sources.iter().zip(&urls).zip(pages) {
        summary.processed += 1;
        let html = match page {
            Ok(html) => html,
            Err(err) => {
                warn!(source = %source, error = %err, "could not fetch source page");
                summary.skipped += 1;
                continue;
            }
        };

        if save_snapshot(settings, source, &html)? {
            info!(source = %source, url = %url, "saved boon table");
            summary.imported += 1;
        } else {
            summary.skipped += 1;
        }
    }

    Ok(summary)
}

/// Writes the located table of `html`, or the whole page when there is none.
/// Returns whether a table snapshot was written.
fn save_snapshot(settings: &Settings, source: &Source, html: &str) -> Result<bool> {
    match snapshot_page(html, &settings.profile) {
        Ok(table) => {
            let path = settings.snapshot_path(source);
            fs::write(&path, table).with_context(|| format!("writing {}", path.display()))?;
            Ok(true)
        }
        Err(ExtractError::TableNotFound) => {
            let path = settings.full_page_path(source);
            fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;
            warn!(source = %source, path = %path.display(), "no boon table found, saved full page");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

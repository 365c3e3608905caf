// ABOUTME: The seed stage: extracts records from every saved snapshot and replaces the record set.
// ABOUTME: Extraction runs on blocking workers; the store write is a single transaction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use compendium_extract::{extract_snapshot, Extraction, Record, Source, TableProfile};
use compendium_store::Store;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::settings::Settings;
use crate::summary::StageSummary;

enum SourceOutcome {
    Extracted(Extraction),
    NoSnapshot,
    Failed(anyhow::Error),
}

async fn extract_source(path: PathBuf, key: String, profile: TableProfile) -> SourceOutcome {
    if !path.is_file() {
        return SourceOutcome::NoSnapshot;
    }
    let task = tokio::task::spawn_blocking(move || -> Result<Extraction> {
        let html = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(extract_snapshot(&html, &key, &profile)?)
    });
    match task.await {
        Ok(Ok(extraction)) => SourceOutcome::Extracted(extraction),
        Ok(Err(err)) => SourceOutcome::Failed(err),
        Err(join) => SourceOutcome::Failed(join.into()),
    }
}

pub async fn run(settings: &Settings, store: &mut Store) -> Result<StageSummary> {
    let jobs: Vec<(Source, PathBuf)> = settings
        .sources
        .iter()
        .map(|source| (source.clone(), settings.snapshot_path(source)))
        .collect();

    let outcomes: Vec<(Source, SourceOutcome)> = stream::iter(jobs)
        .map(|(source, path)| {
            let key = source.key();
            let profile = settings.profile.clone();
            async move { (source, extract_source(path, key, profile).await) }
        })
        .buffered(settings.concurrency)
        .collect()
        .await;

    let mut summary = StageSummary::new("seed");
    let mut records: Vec<Record> = Vec::new();
    for (source, outcome) in outcomes {
        match outcome {
            SourceOutcome::Extracted(extraction) => {
                summary.processed += extraction.records.len() + extraction.skipped.len();
                summary.skipped += extraction.skipped.len();
                info!(
                    source = %source,
                    records = extraction.records.len(),
                    skipped = extraction.skipped.len(),
                    decorative = extraction.decorative,
                    "extracted boons"
                );
                records.extend(extraction.records);
            }
            SourceOutcome::NoSnapshot => {
                warn!(source = %source, path = %settings.snapshot_path(&source).display(), "no snapshot, run fetch first");
            }
            SourceOutcome::Failed(err) => {
                warn!(source = %source, error = %format!("{:#}", err), "could not extract snapshot");
            }
        }
    }

    summary.imported = store.replace_all(&records)?;
    Ok(summary)
}

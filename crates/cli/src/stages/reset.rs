// ABOUTME: The reset stage: empties records and assets, leaving files on disk alone.

use anyhow::Result;
use compendium_store::Store;
use tracing::info;

use crate::summary::StageSummary;

pub fn run(store: &mut Store) -> Result<StageSummary> {
    let mut summary = StageSummary::new("reset");
    summary.processed = store.counts_by_source()?.iter().map(|(_, n)| n).sum();
    store.reset()?;
    info!(records = summary.processed, "database reset");
    Ok(summary)
}

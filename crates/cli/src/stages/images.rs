// ABOUTME: The images stage: downloads referenced images once per URL and rewrites fragments to local paths.
// ABOUTME: New assets and rewritten fields are written back in one transaction each, then overrides run.

use std::collections::HashMap;

use anyhow::Result;
use compendium_extract::{canonical_url, rewrite_images, FieldName, ImageAsset, LocalImage, Record};
use compendium_fetch::{plan_requests, AssetOutcome, ImageResolver};
use compendium_store::{FieldUpdate, Store};
use tracing::{info, warn};

use crate::settings::Settings;
use crate::stages::overrides;
use crate::summary::StageSummary;

/// Fields scanned for images; the primary cell unless `all_fields` is set.
pub fn image_fields(all_fields: bool) -> Vec<FieldName> {
    if all_fields {
        FieldName::ALL.to_vec()
    } else {
        vec![FieldName::Primary]
    }
}

pub async fn run(settings: &Settings, store: &mut Store, all_fields: bool) -> Result<StageSummary> {
    let fields = image_fields(all_fields);
    let records = store.list_ordered()?;
    let known = store.assets()?;

    let resolver = ImageResolver::new(settings.client()?, settings.public_dir())
        .with_concurrency(settings.concurrency)
        .with_known(known);

    let plan = plan_requests(&records, &fields);
    let outcomes = resolver.resolve_all(&plan).await;

    let mut summary = StageSummary::new("images");
    summary.processed = plan.len();

    let mut fetched = Vec::new();
    let mut resolved: HashMap<String, ImageAsset> = HashMap::new();
    for (request, outcome) in outcomes {
        match outcome {
            AssetOutcome::Fetched(asset) => {
                fetched.push(asset.clone());
                resolved.insert(asset.origin_url.clone(), asset);
            }
            AssetOutcome::Reused(asset) => {
                resolved.insert(asset.origin_url.clone(), asset);
            }
            AssetOutcome::Failed(message) => {
                warn!(url = %request.fetch_url, error = %message, "leaving image reference unresolved");
                summary.skipped += 1;
            }
        }
    }
    // Completion order varies; keep the stored asset order stable.
    fetched.sort_by(|a, b| a.origin_url.cmp(&b.origin_url));
    summary.imported = store.insert_assets(&fetched)?;

    let updates = rewrite_updates(&records, &fields, &resolved);
    let rewritten = store.update_fields(&updates)?;
    info!(
        planned = plan.len(),
        fetched = fetched.len(),
        rewritten,
        "resolved image references"
    );

    let overrides = settings.image_overrides()?;
    let patched = overrides::apply(settings, store, &overrides)?;
    if patched > 0 {
        info!(patched, "applied image overrides");
    }

    Ok(summary)
}

/// Field updates pointing every resolvable reference at its local file.
pub fn rewrite_updates(
    records: &[Record],
    fields: &[FieldName],
    resolved: &HashMap<String, ImageAsset>,
) -> Vec<FieldUpdate> {
    let mut updates = Vec::new();
    for record in records {
        for field in fields {
            let (html, count) = rewrite_images(record.fields().get(*field), |image| {
                let url = image.candidate()?;
                let asset = resolved.get(&canonical_url(&url))?;
                Some(LocalImage {
                    local_path: asset.local_path.clone(),
                    alt: image.alt_text().unwrap_or(record.name()).to_string(),
                })
            });
            if count > 0 {
                updates.push(FieldUpdate {
                    source: record.source().to_string(),
                    slug: record.slug().to_string(),
                    field: *field,
                    html,
                });
            }
        }
    }
    updates
}

// ABOUTME: Applies image overrides: records missing an icon borrow the local icon of another record.
// ABOUTME: The borrowed file is copied under the target's own name before the fragment is rewritten.

use std::fs;

use anyhow::Result;
use compendium_extract::icons::split_file_name;
use compendium_extract::image_utils::{icon_local_path, replace_all_images, sanitize_label};
use compendium_extract::{FieldName, ImageOverride, LocalImage, Record};
use compendium_store::{FieldUpdate, Store};
use tracing::{debug, warn};

use crate::settings::Settings;
use crate::stages::existing_local_image;

fn find_by_name(store: &Store, source: &str, name: &str) -> Result<Option<Record>> {
    Ok(store
        .list_source(source)?
        .into_iter()
        .find(|record| record.name() == name))
}

/// Applies every override whose target still lacks a local image.
/// Returns the number of records patched.
pub fn apply(settings: &Settings, store: &mut Store, overrides: &[ImageOverride]) -> Result<usize> {
    let mut updates = Vec::new();

    for entry in overrides {
        let Some(target) = find_by_name(store, &entry.source, &entry.name)? else {
            debug!(source = %entry.source, name = %entry.name, "override target not in store");
            continue;
        };
        if existing_local_image(settings, &target.fields().primary).is_some() {
            continue;
        }

        let fallback = find_by_name(store, &entry.fallback_source, entry.fallback_name())?;
        let Some(borrowed) = fallback
            .as_ref()
            .and_then(|record| existing_local_image(settings, &record.fields().primary))
        else {
            warn!(
                source = %entry.source,
                name = %entry.name,
                fallback_source = %entry.fallback_source,
                fallback_name = %entry.fallback_name(),
                "override fallback has no local image"
            );
            continue;
        };

        let (_, ext) = split_file_name(&borrowed);
        let ext = if ext.is_empty() { "img" } else { ext };
        let file_name = format!("{}_{}.{}", entry.source, sanitize_label(&entry.name), ext);
        let local_path = icon_local_path(&file_name);
        let destination = settings.public_file(&local_path);
        let image = LocalImage {
            local_path,
            alt: entry.name.clone(),
        };
        let (html, count) = replace_all_images(&target.fields().primary, &image);
        if count == 0 {
            warn!(source = %entry.source, name = %entry.name, "override target has no image tag");
            continue;
        }

        if !destination.exists() {
            if let Err(err) = fs::copy(settings.public_file(&borrowed), &destination) {
                warn!(
                    from = %borrowed,
                    to = %destination.display(),
                    error = %err,
                    "could not copy override image"
                );
                continue;
            }
        }
        updates.push(FieldUpdate {
            source: target.source().to_string(),
            slug: target.slug().to_string(),
            field: FieldName::Primary,
            html,
        });
    }

    Ok(store.update_fields(&updates)?)
}

// ABOUTME: Core extraction library for the boon compendium.
// ABOUTME: Provides table location, row extraction, slugs, image reference handling and export rendering.

pub mod combine;
pub mod error;
pub mod html_utils;
pub mod icons;
pub mod image_utils;
pub mod locator;
pub mod models;
pub mod overrides;
pub mod rows;
pub mod slug;

pub use combine::{combine_html, export_rows, ExportRow};
pub use error::ExtractError;
pub use html_utils::{strip_html, summary_line};
pub use icons::{icon_file_name, match_icon_file};
pub use image_utils::{
    asset_file_name, canonical_url, image_refs, resolve_image_url, rewrite_images, ImageRef,
    LocalImage,
};
pub use locator::{locate_table, snapshot_page, LocateStrategy, TableProfile};
pub use models::{FieldName, Fields, ImageAsset, Record, Source, DEFAULT_SOURCES};
pub use overrides::{builtin_overrides, parse_overrides, ImageOverride};
pub use rows::{derive_type, extract_page, extract_snapshot, Extraction, RowIssue};
pub use slug::{slugify, SlugAllocator};

// ----------------------------------------------------------------------------
// URL utilities
// ----------------------------------------------------------------------------

/// Placeholder in page URL templates that is replaced by the source name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Builds the page URL of a source from a template such as
/// `https://hades.fandom.com/wiki/{name}/Boons_(Hades)`.
pub fn source_url(template: &str, source: &Source) -> String {
    template.replace(NAME_PLACEHOLDER, &source.name)
}

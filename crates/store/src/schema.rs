// ABOUTME: SQLite schema for boon records and downloaded icon assets.
// ABOUTME: Maps record fields to their column names.

use compendium_extract::FieldName;

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS boons (
    id INTEGER PRIMARY KEY,
    god TEXT NOT NULL,
    row_idx INTEGER NOT NULL,
    boon_name TEXT NOT NULL,
    slug TEXT NOT NULL,
    boon_html TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    rarity TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    prerequisites TEXT NOT NULL DEFAULT '',
    derived_type TEXT,
    UNIQUE(god, slug)
);

CREATE INDEX IF NOT EXISTS idx_boons_order ON boons(god, row_idx);

CREATE TABLE IF NOT EXISTS icons (
    id INTEGER PRIMARY KEY,
    origin_url TEXT NOT NULL UNIQUE,
    fetch_url TEXT NOT NULL,
    local_path TEXT NOT NULL,
    alt_text TEXT
);
"#;

/// Column holding a record field.
pub(crate) fn field_column(field: FieldName) -> &'static str {
    match field {
        FieldName::Primary => "boon_html",
        FieldName::Description => "description",
        FieldName::Rarity => "rarity",
        FieldName::Notes => "notes",
        FieldName::Prerequisites => "prerequisites",
    }
}

pub(crate) const RECORD_COLUMNS: &str =
    "god, row_idx, boon_name, slug, boon_html, description, rarity, notes, prerequisites, derived_type";

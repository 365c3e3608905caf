// ABOUTME: Typed models for sources, extracted boon records and image assets.
// ABOUTME: Record construction validates the fixed field set and slug invariants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::slug::is_valid_slug;

/// A named origin category whose page yields an ordered set of records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    /// Display name as used in page URLs and snapshot filenames ("Artemis").
    pub name: String,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The key stored on records ("artemis").
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The gods whose boon pages are scraped by default.
pub const DEFAULT_SOURCES: &[&str] = &[
    "Aphrodite",
    "Ares",
    "Artemis",
    "Athena",
    "Demeter",
    "Dionysus",
    "Hermes",
    "Poseidon",
    "Zeus",
    "Chaos",
];

/// Names of the five positional cells of a boon row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Primary,
    Description,
    Rarity,
    Notes,
    Prerequisites,
}

impl FieldName {
    /// All fields in table column order.
    pub const ALL: [FieldName; 5] = [
        FieldName::Primary,
        FieldName::Description,
        FieldName::Rarity,
        FieldName::Notes,
        FieldName::Prerequisites,
    ];
}

/// The HTML fragments of one boon row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    pub primary: String,
    pub description: String,
    pub rarity: String,
    pub notes: String,
    pub prerequisites: String,
}

impl Fields {
    pub fn get(&self, name: FieldName) -> &str {
        match name {
            FieldName::Primary => &self.primary,
            FieldName::Description => &self.description,
            FieldName::Rarity => &self.rarity,
            FieldName::Notes => &self.notes,
            FieldName::Prerequisites => &self.prerequisites,
        }
    }

    pub fn get_mut(&mut self, name: FieldName) -> &mut String {
        match name {
            FieldName::Primary => &mut self.primary,
            FieldName::Description => &mut self.description,
            FieldName::Rarity => &mut self.rarity,
            FieldName::Notes => &mut self.notes,
            FieldName::Prerequisites => &mut self.prerequisites,
        }
    }
}

/// One extracted boon.
///
/// Only constructible through [`Record::new`], which enforces a non-empty
/// source, name and primary fragment plus a well-formed slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    source: String,
    order_index: u32,
    name: String,
    slug: String,
    fields: Fields,
    derived_type: Option<String>,
}

impl Record {
    pub fn new(
        source: impl Into<String>,
        order_index: u32,
        name: impl Into<String>,
        slug: impl Into<String>,
        fields: Fields,
        derived_type: Option<String>,
    ) -> Result<Self, ExtractError> {
        let source = source.into();
        let name = name.into();
        let slug = slug.into();

        if source.trim().is_empty() {
            return Err(ExtractError::invalid("empty source"));
        }
        if name.trim().is_empty() {
            return Err(ExtractError::invalid("empty name"));
        }
        if !is_valid_slug(&slug) {
            return Err(ExtractError::invalid(format!("bad slug {:?}", slug)));
        }
        if fields.primary.trim().is_empty() {
            return Err(ExtractError::invalid(format!(
                "{}/{} has an empty primary field",
                source, slug
            )));
        }

        Ok(Self {
            source,
            order_index,
            name,
            slug,
            fields,
            derived_type: derived_type.filter(|t| !t.is_empty()),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn derived_type(&self) -> Option<&str> {
        self.derived_type.as_deref()
    }

    /// Replaces one field fragment. The primary fragment cannot be emptied.
    pub fn set_field(&mut self, name: FieldName, html: String) -> Result<(), ExtractError> {
        if name == FieldName::Primary && html.trim().is_empty() {
            return Err(ExtractError::invalid("empty primary field"));
        }
        *self.fields.get_mut(name) = html;
        Ok(())
    }
}

/// A downloaded image, deduplicated by its canonical remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Canonical URL (query and fragment stripped), unique per asset.
    pub origin_url: String,
    /// The exact URL that was requested.
    pub fetch_url: String,
    /// Path relative to the public directory.
    pub local_path: String,
    pub alt_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Fields {
        Fields {
            primary: "<b>Alpha</b>".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_source_key_is_lowercase() {
        assert_eq!(Source::new("Artemis").key(), "artemis");
    }

    #[test]
    fn test_record_new_validates() {
        assert!(Record::new("demo", 0, "Alpha", "alpha", fields(), None).is_ok());
        assert!(Record::new("demo", 0, "Alpha", "Alpha", fields(), None).is_err());
        assert!(Record::new("demo", 0, "", "alpha", fields(), None).is_err());
        assert!(Record::new("", 0, "Alpha", "alpha", fields(), None).is_err());
        assert!(Record::new("demo", 0, "Alpha", "alpha", Fields::default(), None).is_err());
    }

    #[test]
    fn test_record_drops_empty_derived_type() {
        let r = Record::new("demo", 0, "Alpha", "alpha", fields(), Some(String::new())).unwrap();
        assert_eq!(r.derived_type(), None);
    }

    #[test]
    fn test_set_field_keeps_primary_non_empty() {
        let mut r = Record::new("demo", 0, "Alpha", "alpha", fields(), None).unwrap();
        assert!(r.set_field(FieldName::Primary, " ".to_string()).is_err());
        r.set_field(FieldName::Notes, "Tier 1".to_string()).unwrap();
        assert_eq!(r.fields().get(FieldName::Notes), "Tier 1");
    }
}

// ABOUTME: Record persistence: transactional replace, ordered listings, search and field updates.
// ABOUTME: Rows read back are revalidated through Record::new.

use compendium_extract::{FieldName, Fields, Record};
use rusqlite::{params, OptionalExtension, Params, Row, Transaction};

use crate::error::{Result, StoreError};
use crate::schema::{field_column, RECORD_COLUMNS};
use crate::Store;

/// A new HTML value for one field of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub source: String,
    pub slug: String,
    pub field: FieldName,
    pub html: String,
}

struct StoredRow {
    source: String,
    order_index: u32,
    name: String,
    slug: String,
    fields: Fields,
    derived_type: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            source: row.get("god")?,
            order_index: row.get("row_idx")?,
            name: row.get("boon_name")?,
            slug: row.get("slug")?,
            fields: Fields {
                primary: row.get("boon_html")?,
                description: row.get("description")?,
                rarity: row.get("rarity")?,
                notes: row.get("notes")?,
                prerequisites: row.get("prerequisites")?,
            },
            derived_type: row.get("derived_type")?,
        })
    }

    fn into_record(self) -> Result<Record> {
        Record::new(
            self.source,
            self.order_index,
            self.name,
            self.slug,
            self.fields,
            self.derived_type,
        )
        .map_err(|e| StoreError::Invalid(e.to_string()))
    }
}

fn insert_records(tx: &Transaction<'_>, records: &[Record]) -> Result<()> {
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO boons ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        RECORD_COLUMNS
    ))?;
    for record in records {
        let f = record.fields();
        stmt.execute(params![
            record.source(),
            record.order_index(),
            record.name(),
            record.slug(),
            f.primary,
            f.description,
            f.rarity,
            f.notes,
            f.prerequisites,
            record.derived_type(),
        ])?;
    }
    Ok(())
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

impl Store {
    /// Replaces the whole record set in one transaction.
    pub fn replace_all(&mut self, records: &[Record]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM boons", [])?;
        insert_records(&tx, records)?;
        tx.commit()?;
        Ok(records.len())
    }

    /// Replaces the records of one source in one transaction.
    pub fn replace_source(&mut self, source: &str, records: &[Record]) -> Result<usize> {
        if let Some(stray) = records.iter().find(|r| r.source() != source) {
            return Err(StoreError::Invalid(format!(
                "record {}/{} does not belong to {}",
                stray.source(),
                stray.slug(),
                source
            )));
        }
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM boons WHERE god = ?1", params![source])?;
        insert_records(&tx, records)?;
        tx.commit()?;
        Ok(records.len())
    }

    fn query_records<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, StoredRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(StoredRow::into_record).collect()
    }

    pub fn find(&self, source: &str, slug: &str) -> Result<Option<Record>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM boons WHERE god = ?1 AND slug = ?2", RECORD_COLUMNS),
                params![source, slug],
                StoredRow::from_row,
            )
            .optional()?;
        row.map(StoredRow::into_record).transpose()
    }

    /// All records ordered by `(source, name)`.
    pub fn list_by_name(&self) -> Result<Vec<Record>> {
        self.query_records(
            &format!("SELECT {} FROM boons ORDER BY god, boon_name", RECORD_COLUMNS),
            [],
        )
    }

    /// All records ordered by `(source, order_index)`.
    pub fn list_ordered(&self) -> Result<Vec<Record>> {
        self.query_records(
            &format!("SELECT {} FROM boons ORDER BY god, row_idx", RECORD_COLUMNS),
            [],
        )
    }

    /// Records of one source in row order.
    pub fn list_source(&self, source: &str) -> Result<Vec<Record>> {
        self.query_records(
            &format!(
                "SELECT {} FROM boons WHERE god = ?1 ORDER BY row_idx",
                RECORD_COLUMNS
            ),
            params![source],
        )
    }

    /// Case-insensitive substring search over name, description and notes.
    pub fn search(&self, term: &str) -> Result<Vec<Record>> {
        self.query_records(
            &format!(
                "SELECT {} FROM boons \
                 WHERE boon_name LIKE ?1 ESCAPE '\\' \
                    OR description LIKE ?1 ESCAPE '\\' \
                    OR notes LIKE ?1 ESCAPE '\\' \
                 ORDER BY god, boon_name",
                RECORD_COLUMNS
            ),
            params![escape_like(term)],
        )
    }

    /// Applies field updates in one transaction; returns the rows changed.
    pub fn update_fields(&mut self, updates: &[FieldUpdate]) -> Result<usize> {
        if let Some(bad) = updates
            .iter()
            .find(|u| u.field == FieldName::Primary && u.html.trim().is_empty())
        {
            return Err(StoreError::Invalid(format!(
                "{}/{} would get an empty primary field",
                bad.source, bad.slug
            )));
        }

        let tx = self.conn.transaction()?;
        let mut changed = 0;
        for update in updates {
            changed += tx.execute(
                &format!(
                    "UPDATE boons SET {} = ?1 WHERE god = ?2 AND slug = ?3",
                    field_column(update.field)
                ),
                params![update.html, update.source, update.slug],
            )?;
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Number of records per source, ordered by source.
    pub fn counts_by_source(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT god, COUNT(*) FROM boons GROUP BY god ORDER BY god")?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(source: &str, idx: u32, name: &str, slug: &str) -> Record {
        let fields = Fields {
            primary: format!("<b>{}</b>", name),
            description: format!("{} deals 50% more damage.", name),
            notes: "Tier 1".to_string(),
            ..Default::default()
        };
        Record::new(source, idx, name, slug, fields, Some("Tier 1".to_string())).unwrap()
    }

    #[test]
    fn test_replace_all_round_trip() {
        let mut store = Store::open_in_memory().unwrap();
        let records = vec![record("zeus", 0, "Bolt", "bolt"), record("ares", 0, "Curse", "curse")];
        store.replace_all(&records).unwrap();

        assert_eq!(store.find("zeus", "bolt").unwrap(), Some(records[0].clone()));
        assert_eq!(store.find("zeus", "nope").unwrap(), None);

        store.replace_all(&records[..1]).unwrap();
        assert_eq!(store.list_ordered().unwrap(), vec![records[0].clone()]);
    }

    #[test]
    fn test_duplicate_slug_rolls_back_whole_replace() {
        let mut store = Store::open_in_memory().unwrap();
        let original = vec![record("zeus", 0, "Bolt", "bolt")];
        store.replace_all(&original).unwrap();

        let clashing = vec![record("zeus", 0, "Bolt", "bolt"), record("zeus", 1, "Bolt", "bolt")];
        assert!(matches!(
            store.replace_all(&clashing),
            Err(StoreError::Sqlite(_))
        ));
        assert_eq!(store.list_ordered().unwrap(), original);
    }

    #[test]
    fn test_replace_source_is_scoped() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .replace_all(&[record("zeus", 0, "Bolt", "bolt"), record("ares", 0, "Curse", "curse")])
            .unwrap();
        store
            .replace_source("zeus", &[record("zeus", 0, "Storm", "storm")])
            .unwrap();

        let names: Vec<String> = store
            .list_ordered()
            .unwrap()
            .iter()
            .map(|r| format!("{}/{}", r.source(), r.slug()))
            .collect();
        assert_eq!(names, vec!["ares/curse", "zeus/storm"]);
        assert!(store
            .replace_source("zeus", &[record("ares", 0, "X", "x")])
            .is_err());
    }

    #[test]
    fn test_orderings() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .replace_all(&[
                record("zeus", 0, "Zap", "zap"),
                record("zeus", 1, "Arc", "arc"),
                record("ares", 0, "Curse", "curse"),
            ])
            .unwrap();

        let names = |rs: Vec<Record>| rs.iter().map(|r| r.name().to_string()).collect::<Vec<_>>();
        assert_eq!(names(store.list_by_name().unwrap()), vec!["Curse", "Arc", "Zap"]);
        assert_eq!(names(store.list_ordered().unwrap()), vec!["Curse", "Zap", "Arc"]);
        assert_eq!(names(store.list_source("zeus").unwrap()), vec!["Zap", "Arc"]);
        assert_eq!(
            store.counts_by_source().unwrap(),
            vec![("ares".to_string(), 1), ("zeus".to_string(), 2)]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_and_literal() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .replace_all(&[record("zeus", 0, "Bolt", "bolt"), record("ares", 0, "Curse", "curse")])
            .unwrap();

        let hits = store.search("BOLT").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug(), "bolt");
        assert_eq!(store.search("50%").unwrap().len(), 2);
        assert_eq!(store.search("5_%").unwrap().len(), 0);
        assert_eq!(store.search("tier").unwrap().len(), 2);
    }

    #[test]
    fn test_update_fields() {
        let mut store = Store::open_in_memory().unwrap();
        store.replace_all(&[record("zeus", 0, "Bolt", "bolt")]).unwrap();

        let changed = store
            .update_fields(&[FieldUpdate {
                source: "zeus".to_string(),
                slug: "bolt".to_string(),
                field: FieldName::Primary,
                html: r#"<img src="/images/icons/zeus_bolt.100" alt="Bolt">"#.to_string(),
            }])
            .unwrap();
        assert_eq!(changed, 1);
        let bolt = store.find("zeus", "bolt").unwrap().unwrap();
        assert!(bolt.fields().primary.starts_with("<img src=\"/images"));

        let empty = FieldUpdate {
            source: "zeus".to_string(),
            slug: "bolt".to_string(),
            field: FieldName::Primary,
            html: "  ".to_string(),
        };
        assert!(matches!(
            store.update_fields(&[empty]),
            Err(StoreError::Invalid(_))
        ));
    }
}

// ABOUTME: Image asset bookkeeping keyed by canonical origin URL.
// ABOUTME: Inserts are idempotent and relocations rewrite record references in the same transaction.

use compendium_extract::ImageAsset;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::error::Result;
use crate::Store;

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<ImageAsset> {
    Ok(ImageAsset {
        origin_url: row.get("origin_url")?,
        fetch_url: row.get("fetch_url")?,
        local_path: row.get("local_path")?,
        alt_text: row.get("alt_text")?,
    })
}

impl Store {
    /// Every known asset, ordered by origin URL.
    pub fn assets(&self) -> Result<Vec<ImageAsset>> {
        let mut stmt = self.conn.prepare(
            "SELECT origin_url, fetch_url, local_path, alt_text FROM icons ORDER BY origin_url",
        )?;
        let assets = stmt
            .query_map([], asset_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(assets)
    }

    pub fn find_asset(&self, origin_url: &str) -> Result<Option<ImageAsset>> {
        let asset = self
            .conn
            .query_row(
                "SELECT origin_url, fetch_url, local_path, alt_text FROM icons WHERE origin_url = ?1",
                params![origin_url],
                asset_from_row,
            )
            .optional()?;
        Ok(asset)
    }

    /// Inserts assets in one transaction, ignoring already known origin URLs.
    /// Returns the number of rows actually added.
    pub fn insert_assets(&mut self, assets: &[ImageAsset]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO icons (origin_url, fetch_url, local_path, alt_text) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for asset in assets {
                added += stmt.execute(params![
                    asset.origin_url,
                    asset.fetch_url,
                    asset.local_path,
                    asset.alt_text
                ])?;
            }
        }
        tx.commit()?;
        Ok(added)
    }

    /// Points everything that referenced `old_local` at `new_local`.
    ///
    /// Updates asset rows and every record field holding `src="/old_local"`
    /// in one transaction. Returns the number of records touched.
    pub fn relocate_asset(&mut self, old_local: &str, new_local: &str) -> Result<usize> {
        let old_src = format!("src=\"/{}\"", old_local);
        let new_src = format!("src=\"/{}\"", new_local);

        let tx = self.conn.transaction()?;
        let assets = tx.execute(
            "UPDATE icons SET local_path = ?2 WHERE local_path = ?1",
            params![old_local, new_local],
        )?;
        let records = tx.execute(
            "UPDATE boons SET \
                boon_html = replace(boon_html, ?1, ?2), \
                description = replace(description, ?1, ?2), \
                rarity = replace(rarity, ?1, ?2), \
                notes = replace(notes, ?1, ?2), \
                prerequisites = replace(prerequisites, ?1, ?2) \
             WHERE instr(boon_html, ?1) > 0 \
                OR instr(description, ?1) > 0 \
                OR instr(rarity, ?1) > 0 \
                OR instr(notes, ?1) > 0 \
                OR instr(prerequisites, ?1) > 0",
            params![old_src, new_src],
        )?;
        tx.commit()?;

        debug!(old_local, new_local, assets, records, "relocated asset");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compendium_extract::{Fields, Record};
    use pretty_assertions::assert_eq;

    fn asset(url: &str, path: &str) -> ImageAsset {
        ImageAsset {
            origin_url: url.to_string(),
            fetch_url: format!("{}?cb=1", url),
            local_path: path.to_string(),
            alt_text: Some("Bolt".to_string()),
        }
    }

    #[test]
    fn test_insert_assets_ignores_known_urls() {
        let mut store = Store::open_in_memory().unwrap();
        let first = asset("https://a.example/bolt.png", "images/icons/zeus_bolt.png");
        assert_eq!(store.insert_assets(&[first.clone()]).unwrap(), 1);

        let again = asset("https://a.example/bolt.png", "images/icons/other.png");
        assert_eq!(store.insert_assets(&[again]).unwrap(), 0);
        assert_eq!(store.find_asset("https://a.example/bolt.png").unwrap(), Some(first));
        assert_eq!(store.assets().unwrap().len(), 1);
    }

    #[test]
    fn test_relocate_rewrites_records() {
        let mut store = Store::open_in_memory().unwrap();
        let fields = Fields {
            primary: r#"<img src="/images/icons/zeus_bolt.100" alt="Bolt">"#.to_string(),
            ..Default::default()
        };
        let other = Fields {
            primary: r#"<img src="/images/icons/zeus_bolt.1000" alt="Other">"#.to_string(),
            ..Default::default()
        };
        store
            .replace_all(&[
                Record::new("zeus", 0, "Bolt", "bolt", fields, None).unwrap(),
                Record::new("zeus", 1, "Other", "other", other, None).unwrap(),
            ])
            .unwrap();
        store
            .insert_assets(&[asset("https://a.example/bolt", "images/icons/zeus_bolt.100")])
            .unwrap();

        let touched = store
            .relocate_asset("images/icons/zeus_bolt.100", "images/icons/zeus_bolt_icon.100")
            .unwrap();
        assert_eq!(touched, 1);

        let bolt = store.find("zeus", "bolt").unwrap().unwrap();
        assert_eq!(
            bolt.fields().primary,
            r#"<img src="/images/icons/zeus_bolt_icon.100" alt="Bolt">"#
        );
        let other = store.find("zeus", "other").unwrap().unwrap();
        assert!(other.fields().primary.contains("zeus_bolt.1000"));
        assert_eq!(
            store.assets().unwrap()[0].local_path,
            "images/icons/zeus_bolt_icon.100"
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .insert_assets(&[asset("https://a.example/bolt", "images/icons/zeus_bolt.100")])
            .unwrap();
        store.reset().unwrap();
        assert!(store.assets().unwrap().is_empty());
        assert!(store.list_ordered().unwrap().is_empty());
    }
}

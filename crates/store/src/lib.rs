// ABOUTME: SQLite-backed store for boon records and image assets.
// ABOUTME: Explicit Store handle with transactional replace, search and asset bookkeeping.

//! Record store.
//!
//! Key behaviors:
//! - A `Store` owns one connection and is passed explicitly to each stage.
//! - Every multi-row write runs in a single transaction, so readers never
//!   observe a half-replaced record set.
//! - `(source, slug)` and asset `origin_url` uniqueness are enforced by the
//!   schema.

mod assets;
pub mod error;
mod records;
mod schema;

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

pub use error::{Result, StoreError};
pub use records::FieldUpdate;

/// Handle to the compendium database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened store");
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Deletes every record and every asset row.
    pub fn reset(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM boons", [])?;
        tx.execute("DELETE FROM icons", [])?;
        tx.commit()?;
        Ok(())
    }
}

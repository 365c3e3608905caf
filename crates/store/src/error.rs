// ABOUTME: Error types for the SQLite record store.
// ABOUTME: Wraps rusqlite and io failures and rejects rows that no longer form valid records.

use thiserror::Error;

/// Errors raised by the record store. All of them are fatal for a stage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row or a requested change violates a record invariant.
    #[error("invalid data: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

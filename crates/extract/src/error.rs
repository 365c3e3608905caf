// ABOUTME: Error types for table location, row extraction and record validation.
// ABOUTME: Provides ExtractError with TableNotFound, MalformedRow and InvalidRecord variants.

use thiserror::Error;

/// Errors that can occur while turning a page into records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Neither the marker class nor the heading fallback located a table.
    #[error("boon table not found")]
    TableNotFound,

    /// A data row carried fewer cells than the fixed field set needs.
    #[error("malformed row {row}: expected 5 cells, found {found}")]
    MalformedRow { row: usize, found: usize },

    /// The extracted values do not form a valid record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl ExtractError {
    /// Creates an InvalidRecord error with a custom message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ExtractError::InvalidRecord(msg.into())
    }

    /// Returns true for errors that only affect a single row.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            ExtractError::MalformedRow { .. } | ExtractError::InvalidRecord(_)
        )
    }
}

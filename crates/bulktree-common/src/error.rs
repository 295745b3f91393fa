//! Error types for the bulk-loaded index.

use thiserror::Error;

/// Result type alias using BulkTreeError.
pub type Result<T> = std::result::Result<T, BulkTreeError>;

/// Errors that can occur while configuring or building an index.
///
/// Query misses are not errors; they are reported through the query return
/// types instead.
#[derive(Debug, Error)]
pub enum BulkTreeError {
    // Construction errors
    #[error("Invalid node capacity: {capacity} (must be between {min} and {max})")]
    InvalidCapacity {
        capacity: usize,
        min: usize,
        max: usize,
    },

    #[error("Cannot bulk build an index from empty input")]
    EmptyInput,

    #[error("Input not sorted: entry {position} has a smaller key than its predecessor")]
    UnsortedInput { position: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Structural errors
    #[error("B+ tree corrupted: {0}")]
    Corrupted(String),
}

impl From<serde_json::Error> for BulkTreeError {
    fn from(err: serde_json::Error) -> Self {
        BulkTreeError::ConfigError(err.to_string())
    }
}

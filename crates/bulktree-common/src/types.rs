//! Primitive types shared by the index crates.

use serde::{Deserialize, Serialize};

/// Identifier of a row in the column store that owns the indexed data.
pub type RowId = u64;

/// One (key, row id) pair of the sorted input.
///
/// Entries are copied into leaves during the build; the caller keeps
/// ownership of its input slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexEntry<K> {
    /// Indexed key.
    pub key: K,
    /// Row this key belongs to.
    pub row_id: RowId,
}

impl<K> IndexEntry<K> {
    /// Creates a new entry.
    pub fn new(key: K, row_id: RowId) -> Self {
        Self { key, row_id }
    }
}

impl<K> From<(K, RowId)> for IndexEntry<K> {
    fn from((key, row_id): (K, RowId)) -> Self {
        Self { key, row_id }
    }
}

impl<K: std::fmt::Display> std::fmt::Display for IndexEntry<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.key, self.row_id)
    }
}

/// Returns the position of the first entry whose key is smaller than its
/// predecessor's, or None when the entries are in ascending key order.
pub fn first_unsorted<K: Ord>(entries: &[IndexEntry<K>]) -> Option<usize> {
    entries
        .windows(2)
        .position(|pair| pair[1].key < pair[0].key)
        .map(|i| i + 1)
}

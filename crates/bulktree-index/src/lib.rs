//! Bulk-loaded B+ tree index.
//!
//! This crate provides:
//! - Single-pass construction from (key, row id) pairs sorted by key
//! - Exact, greater-or-equal and less-than queries
//! - Overflow leaves that keep duplicate runs off the indexed path
//! - Leaf chain iterators, statistics and invariant checks

mod btree;

pub use btree::{
    build_bulk, exact_search, first_greater_or_equal, first_greater_than, BulkTree, Duplicates,
    Entries, InnerNode, LeafNode, Leaves, LessThan, Node, NodeArena, NodeId, TreeStats,
};
pub use bulktree_common::{BulkTreeError, IndexConfig, IndexEntry, Result, RowId};

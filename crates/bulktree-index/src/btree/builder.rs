//! Single-pass bulk loading from sorted input.
//!
//! The builder keeps a cursor on the rightmost leaf and its parent. Because
//! input keys never decrease, every new separator is the largest so far:
//! new leaves are always appended as the parent's rightmost child, and a
//! full parent is split so that only its right half is detached. The
//! builder never descends from the root or searches for an insert position.
//!
//! Duplicates that would start a new leaf go to overflow leaves instead.
//! Those are chained after the current leaf but get no separator and no
//! parent, so descent always ends on the leaf holding a key's first
//! occurrence.

use super::arena::{NodeArena, NodeId};
use bulktree_common::IndexEntry;

/// Structure produced by a bulk build.
pub(crate) struct BuiltTree<K> {
    pub(crate) arena: NodeArena<K>,
    pub(crate) root: NodeId,
    /// First leaf of the chain.
    pub(crate) head: NodeId,
    pub(crate) indexed_leaves: usize,
    pub(crate) overflow_leaves: usize,
    pub(crate) inner_splits: usize,
}

/// Cursor state for one bulk build.
pub(crate) struct BulkBuilder<K> {
    arena: NodeArena<K>,
    root: NodeId,
    head: NodeId,
    /// Rightmost indexed leaf; receives entries outside overflow runs.
    current_leaf: NodeId,
    /// Parent of `current_leaf`.
    current_parent: NodeId,
    /// Last leaf in chain order: `current_leaf` or the end of the overflow
    /// run that followed it.
    tail: NodeId,
    indexed_leaves: usize,
    overflow_leaves: usize,
    inner_splits: usize,
}

impl<K: Ord + Copy> BulkBuilder<K> {
    /// Creates the root and the first leaf.
    pub(crate) fn new(capacity: usize, expected_entries: usize) -> Self {
        let mut arena = NodeArena::with_expected_entries(capacity, expected_entries);
        let root = arena.allocate_inner(None);
        let first_leaf = arena.allocate_leaf();
        arena.leaf_mut(first_leaf).parent = Some(root);
        arena.inner_mut(root).add_child(first_leaf);

        Self {
            arena,
            root,
            head: first_leaf,
            current_leaf: first_leaf,
            current_parent: root,
            tail: first_leaf,
            indexed_leaves: 1,
            overflow_leaves: 0,
            inner_splits: 0,
        }
    }

    /// Consumes `entries`, which must be sorted ascending by key.
    pub(crate) fn build(mut self, entries: &[IndexEntry<K>]) -> BuiltTree<K> {
        let mut i = 0;
        while i < entries.len() {
            if self.arena.leaf(self.current_leaf).is_full() {
                let new_leaf = self.arena.allocate_leaf();

                if self.arena.inner(self.current_parent).is_full() {
                    self.current_parent = self.arena.split(self.current_parent, &mut self.root);
                    self.arena.leaf_mut(self.current_leaf).parent = Some(self.current_parent);
                    self.inner_splits += 1;
                }

                if starts_new_key(entries, i) {
                    self.append_indexed_leaf(new_leaf, entries[i].key);
                } else {
                    i = self.fill_overflow(new_leaf, entries, i);
                    continue;
                }
            }

            let entry = entries[i];
            self.arena
                .leaf_mut(self.current_leaf)
                .add_entry(entry.key, entry.row_id);
            i += 1;
        }

        BuiltTree {
            arena: self.arena,
            root: self.root,
            head: self.head,
            indexed_leaves: self.indexed_leaves,
            overflow_leaves: self.overflow_leaves,
            inner_splits: self.inner_splits,
        }
    }

    /// Hangs `leaf` under the current parent with `first_key` as separator
    /// and makes it the current leaf.
    fn append_indexed_leaf(&mut self, leaf: NodeId, first_key: K) {
        let parent = self.arena.inner_mut(self.current_parent);
        parent.add_key(first_key);
        parent.add_child(leaf);
        self.arena.leaf_mut(leaf).parent = Some(self.current_parent);

        self.arena.link_leaves(self.tail, leaf);
        self.current_leaf = leaf;
        self.tail = leaf;
        self.indexed_leaves += 1;
    }

    /// Writes the duplicate run starting at `start` into overflow leaves,
    /// beginning with `first`. Returns the index of the first entry with a
    /// different key.
    fn fill_overflow(&mut self, first: NodeId, entries: &[IndexEntry<K>], start: usize) -> usize {
        let key = entries[start].key;
        self.arena.leaf_mut(first).set_as_overflow();
        self.arena.link_leaves(self.tail, first);
        self.overflow_leaves += 1;

        let mut leaf = first;
        let mut i = start;
        while i < entries.len() && entries[i].key == key {
            if self.arena.leaf(leaf).is_full() {
                let next = self.arena.allocate_leaf();
                self.arena.leaf_mut(next).set_as_overflow();
                self.arena.link_leaves(leaf, next);
                self.overflow_leaves += 1;
                leaf = next;
            }
            self.arena.leaf_mut(leaf).add_entry(key, entries[i].row_id);
            i += 1;
        }

        tracing::trace!(
            after = %self.current_leaf,
            entries = i - start,
            "duplicate run moved to overflow leaves"
        );
        self.tail = leaf;
        i
    }
}

/// True when `entries[i]` is not a repeat of the previous key. The first
/// entry has no predecessor and always starts a new key.
#[inline]
fn starts_new_key<K: Ord>(entries: &[IndexEntry<K>], i: usize) -> bool {
    i == 0 || entries[i].key != entries[i - 1].key
}

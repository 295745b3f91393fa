//! Iterators over the leaf chain.

use super::arena::{NodeArena, NodeId};
use super::node::LeafNode;
use bulktree_common::{IndexEntry, RowId};

/// Iterator over leaves in chain order, yielding each leaf with its id.
pub struct Leaves<'a, K> {
    arena: &'a NodeArena<K>,
    next: Option<NodeId>,
}

impl<'a, K: Copy> Leaves<'a, K> {
    pub(crate) fn new(arena: &'a NodeArena<K>, start: Option<NodeId>) -> Self {
        Self { arena, next: start }
    }
}

impl<'a, K: Copy> Iterator for Leaves<'a, K> {
    type Item = (NodeId, &'a LeafNode<K>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let leaf = self.arena.leaf(id);
        self.next = leaf.next();
        Some((id, leaf))
    }
}

/// Iterator over entries in chain order, starting at a slot of a leaf.
pub struct Entries<'a, K> {
    arena: &'a NodeArena<K>,
    leaf: Option<NodeId>,
    position: usize,
}

impl<'a, K: Copy> Entries<'a, K> {
    pub(crate) fn new(arena: &'a NodeArena<K>, leaf: Option<NodeId>, position: usize) -> Self {
        Self {
            arena,
            leaf,
            position,
        }
    }
}

impl<'a, K: Copy> Iterator for Entries<'a, K> {
    type Item = &'a IndexEntry<K>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.arena.leaf(self.leaf?);
            if let Some(entry) = leaf.entries().get(self.position) {
                self.position += 1;
                return Some(entry);
            }
            self.leaf = leaf.next();
            self.position = 0;
        }
    }
}

/// Row ids of every occurrence of one key, across indexed and overflow
/// leaves.
pub struct Duplicates<'a, K> {
    entries: Entries<'a, K>,
    key: K,
    done: bool,
}

impl<'a, K: Copy> Duplicates<'a, K> {
    pub(crate) fn new(entries: Entries<'a, K>, key: K) -> Self {
        Self {
            entries,
            key,
            done: false,
        }
    }
}

impl<'a, K: Ord + Copy> Iterator for Duplicates<'a, K> {
    type Item = RowId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.entries.next() {
            Some(entry) if entry.key == self.key => Some(entry.row_id),
            _ => {
                self.done = true;
                None
            }
        }
    }
}

impl<'a, K: Ord + Copy> std::iter::FusedIterator for Duplicates<'a, K> {}

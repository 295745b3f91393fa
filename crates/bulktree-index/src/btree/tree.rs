//! Read-only B+Tree handle and its query operations.

use super::arena::{NodeArena, NodeId};
use super::builder::BulkBuilder;
use super::iter::{Duplicates, Entries, Leaves};
use super::node::Node;
use super::search::{exact_search_by_key, first_greater_or_equal_by_key, first_greater_than};
use bulktree_common::{first_unsorted, BulkTreeError, IndexConfig, IndexEntry, Result, RowId};

/// Outcome of [`BulkTree::less_than`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessThan {
    /// Row id of the entry immediately before the first key `>= key`.
    Found(RowId),
    /// `key` is not larger than the smallest stored key.
    NotFound,
    /// `key` is larger than every stored key.
    EndOfKeyspace,
}

impl LessThan {
    /// Returns the row id for `Found`, None otherwise.
    #[inline]
    pub fn row_id(self) -> Option<RowId> {
        match self {
            LessThan::Found(row_id) => Some(row_id),
            LessThan::NotFound | LessThan::EndOfKeyspace => None,
        }
    }
}

/// Shape of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    /// Number of indexed entries.
    pub entries: usize,
    /// Inner nodes, including the root.
    pub inner_nodes: usize,
    /// Leaves reachable by descent.
    pub indexed_leaves: usize,
    /// Leaves holding duplicate runs, reachable only through the chain.
    pub overflow_leaves: usize,
    /// Levels including the leaf level.
    pub height: usize,
}

/// B+Tree index bulk-loaded from sorted (key, row id) pairs.
///
/// The tree is immutable once built. All queries take `&self`, so a tree
/// can be shared between threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BulkTree<K> {
    pub(crate) arena: NodeArena<K>,
    pub(crate) root: NodeId,
    /// First leaf of the chain.
    pub(crate) head: NodeId,
    config: IndexConfig,
    stats: TreeStats,
}

impl<K: Ord + Copy> BulkTree<K> {
    /// Builds a tree over `entries`, which must be sorted ascending by key.
    ///
    /// Equal keys must be adjacent; their order is preserved and the first
    /// one is the occurrence [`lookup`](Self::lookup) reports.
    pub fn build(entries: &[IndexEntry<K>], config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        if entries.is_empty() {
            return Err(BulkTreeError::EmptyInput);
        }
        if config.validate_input {
            if let Some(position) = first_unsorted(entries) {
                return Err(BulkTreeError::UnsortedInput { position });
            }
        }

        let built = BulkBuilder::new(config.node_capacity, entries.len()).build(entries);
        let inner_nodes = built.arena.len() - built.indexed_leaves - built.overflow_leaves;

        let mut tree = Self {
            arena: built.arena,
            root: built.root,
            head: built.head,
            config: config.clone(),
            stats: TreeStats {
                entries: entries.len(),
                inner_nodes,
                indexed_leaves: built.indexed_leaves,
                overflow_leaves: built.overflow_leaves,
                height: 0,
            },
        };
        tree.stats.height = tree.compute_height();

        tracing::debug!(
            entries = tree.stats.entries,
            capacity = config.node_capacity,
            height = tree.stats.height,
            inner_nodes = tree.stats.inner_nodes,
            indexed_leaves = tree.stats.indexed_leaves,
            overflow_leaves = tree.stats.overflow_leaves,
            inner_splits = built.inner_splits,
            "bulk-built B+ tree index"
        );

        Ok(tree)
    }

    /// Builds a tree from `(key, row id)` tuples.
    pub fn from_pairs(pairs: &[(K, RowId)], config: &IndexConfig) -> Result<Self> {
        let entries: Vec<IndexEntry<K>> = pairs.iter().map(|&pair| pair.into()).collect();
        Self::build(&entries, config)
    }

    // =========================================================================
    // Point and range queries
    // =========================================================================

    /// Walks from the root to the indexed leaf that holds the first
    /// occurrence of `key`, or where it would be.
    ///
    /// Never returns an overflow leaf.
    pub fn descend(&self, key: &K) -> NodeId {
        let mut current = self.root;
        loop {
            match &self.arena[current] {
                Node::Inner(inner) => {
                    let position = first_greater_than(inner.keys(), key);
                    current = inner.children()[position];
                }
                Node::Leaf(_) => return current,
            }
        }
    }

    /// Returns the row id of the first occurrence of `key`.
    ///
    /// Later duplicates are not reported; use
    /// [`duplicates`](Self::duplicates) to see all of them.
    pub fn lookup(&self, key: &K) -> Option<RowId> {
        let leaf = self.arena.leaf(self.descend(key));
        let entries = leaf.entries();
        let mut position = exact_search_by_key(entries, key, |e| &e.key).ok()?;
        // The probe may hit the middle of a run; report its first slot.
        while position > 0 && entries[position - 1].key == *key {
            position -= 1;
        }
        Some(entries[position].row_id)
    }

    /// Returns the row id of the first entry whose key is `>= key`.
    ///
    /// Follows the leaf chain, overflow leaves included, when the descended
    /// leaf has no such entry.
    pub fn greater_or_equal(&self, key: &K) -> Option<RowId> {
        let mut leaf_id = self.descend(key);
        loop {
            let leaf = self.arena.leaf(leaf_id);
            let position = first_greater_or_equal_by_key(leaf.entries(), key, |e| &e.key);
            if let Some(entry) = leaf.entries().get(position) {
                return Some(entry.row_id);
            }
            leaf_id = leaf.next()?;
        }
    }

    /// Returns the row id of the entry just before the first key `>= key`.
    ///
    /// When that key starts a leaf, the answer is the last slot of the
    /// previous leaf, which may be an overflow leaf. Keys larger than every
    /// stored key yield [`LessThan::EndOfKeyspace`].
    pub fn less_than(&self, key: &K) -> LessThan {
        let mut leaf_id = self.descend(key);
        loop {
            let leaf = self.arena.leaf(leaf_id);
            let position = first_greater_or_equal_by_key(leaf.entries(), key, |e| &e.key);

            if position < leaf.num_keys() {
                if position > 0 {
                    return LessThan::Found(leaf.entries()[position - 1].row_id);
                }
                return match leaf.previous() {
                    Some(previous) => self
                        .arena
                        .leaf(previous)
                        .last_row_id()
                        .map_or(LessThan::NotFound, LessThan::Found),
                    None => LessThan::NotFound,
                };
            }

            match leaf.next() {
                Some(next) => leaf_id = next,
                None => return LessThan::EndOfKeyspace,
            }
        }
    }

    // =========================================================================
    // Leaf chain traversal
    // =========================================================================

    /// Iterates over every leaf in chain order, overflow leaves included.
    pub fn leaves(&self) -> Leaves<'_, K> {
        Leaves::new(&self.arena, Some(self.head))
    }

    /// Iterates over every entry in chain order, which is the input order.
    pub fn iter(&self) -> Entries<'_, K> {
        Entries::new(&self.arena, Some(self.head), 0)
    }

    /// Iterates over the row ids of every occurrence of `key`, in input
    /// order.
    pub fn duplicates(&self, key: &K) -> Duplicates<'_, K> {
        let leaf_id = self.descend(key);
        let leaf = self.arena.leaf(leaf_id);
        let position = first_greater_or_equal_by_key(leaf.entries(), key, |e| &e.key);
        Duplicates::new(Entries::new(&self.arena, Some(leaf_id), position), *key)
    }

    /// Iterates over all entries with key `>= key`, in input order.
    pub fn range_from(&self, key: &K) -> impl Iterator<Item = &IndexEntry<K>> + '_ {
        let start = *key;
        let leaf_id = self.descend(key);
        let leaf = self.arena.leaf(leaf_id);
        let position = first_greater_or_equal_by_key(leaf.entries(), key, |e| &e.key);
        // Overflow leaves after the descended leaf may still hold smaller keys.
        Entries::new(&self.arena, Some(leaf_id), position).skip_while(move |e| e.key < start)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of indexed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.stats.entries
    }

    /// Always false: empty input is rejected at build time.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stats.entries == 0
    }

    /// Maximum keys per node this tree was built with.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Levels including the leaf level.
    #[inline]
    pub fn height(&self) -> usize {
        self.stats.height
    }

    #[inline]
    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node at `id`, for diagnostics.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.arena.get(id)
    }

    fn compute_height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let Node::Inner(inner) = &self.arena[current] {
            height += 1;
            current = inner.children()[0];
        }
        height
    }
}

impl<K: Ord + Copy + std::fmt::Debug> BulkTree<K> {
    /// Emits one debug event per input entry with the row id `lookup`
    /// returns for its key.
    pub fn trace_index(&self, entries: &[IndexEntry<K>]) {
        tracing::debug!(entries = entries.len(), "B+ tree index contents");
        for entry in entries {
            tracing::debug!(key = ?entry.key, row_id = ?self.lookup(&entry.key), "index entry");
        }
    }
}

impl<'a, K: Ord + Copy> IntoIterator for &'a BulkTree<K> {
    type Item = &'a IndexEntry<K>;
    type IntoIter = Entries<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bulk-builds an index over sorted `entries`.
pub fn build_bulk<K: Ord + Copy>(
    entries: &[IndexEntry<K>],
    config: &IndexConfig,
) -> Result<BulkTree<K>> {
    BulkTree::build(entries, config)
}

//! Node model: a closed set of inner and leaf nodes.

use super::arena::NodeId;
use bulktree_common::{IndexEntry, RowId};

/// Inner node: separator keys plus one more child than keys.
///
/// `children[i]` covers keys below `keys[i]`; the last child covers the
/// remainder.
#[derive(Debug, Clone)]
pub struct InnerNode<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    capacity: usize,
}

impl<K: Copy> InnerNode<K> {
    /// Creates an empty inner node.
    pub(crate) fn new(capacity: usize, parent: Option<NodeId>) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity + 1),
            parent,
            capacity,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() == self.capacity
    }

    #[inline]
    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Appends a separator key.
    #[inline]
    pub(crate) fn add_key(&mut self, key: K) {
        debug_assert!(!self.is_full(), "add_key on a full inner node");
        self.keys.push(key);
    }

    /// Removes the key at `position`, shifting later keys left.
    #[inline]
    pub(crate) fn remove_key(&mut self, position: usize) -> K {
        self.keys.remove(position)
    }

    /// Appends a child as the new rightmost child.
    #[inline]
    pub(crate) fn add_child(&mut self, child: NodeId) {
        debug_assert!(
            self.children.len() <= self.capacity,
            "add_child on an inner node with a full child array"
        );
        self.children.push(child);
    }
}

/// Leaf node: sorted (key, row id) slots and links to adjacent leaves.
///
/// Overflow leaves carry later occurrences of a duplicate key. They have no
/// parent and are reachable only through `previous` / `next`.
#[derive(Debug, Clone)]
pub struct LeafNode<K> {
    pub(crate) entries: Vec<IndexEntry<K>>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) overflow: bool,
    capacity: usize,
}

impl<K: Copy> LeafNode<K> {
    /// Creates an empty, unlinked leaf.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            parent: None,
            previous: None,
            next: None,
            overflow: false,
            capacity,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    #[inline]
    pub fn num_keys(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn entries(&self) -> &[IndexEntry<K>] {
        &self.entries
    }

    #[inline]
    pub fn is_overflow(&self) -> bool {
        self.overflow
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    #[inline]
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Row id of the last slot, if any.
    #[inline]
    pub fn last_row_id(&self) -> Option<RowId> {
        self.entries.last().map(|e| e.row_id)
    }

    /// Appends a slot. Input is sorted, so appending keeps the leaf sorted.
    #[inline]
    pub(crate) fn add_entry(&mut self, key: K, row_id: RowId) {
        debug_assert!(!self.is_full(), "add_entry on a full leaf");
        self.entries.push(IndexEntry { key, row_id });
    }

    /// Detaches the leaf from the indexed path.
    #[inline]
    pub(crate) fn set_as_overflow(&mut self) {
        self.overflow = true;
        self.parent = None;
    }
}

/// A tree node.
#[derive(Debug, Clone)]
pub enum Node<K> {
    Inner(InnerNode<K>),
    Leaf(LeafNode<K>),
}

impl<K: Copy> Node<K> {
    #[inline]
    pub fn is_full(&self) -> bool {
        match self {
            Node::Inner(inner) => inner.is_full(),
            Node::Leaf(leaf) => leaf.is_full(),
        }
    }

    #[inline]
    pub fn num_keys(&self) -> usize {
        match self {
            Node::Inner(inner) => inner.num_keys(),
            Node::Leaf(leaf) => leaf.num_keys(),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Inner(inner) => inner.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Inner(inner) => inner.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub fn as_inner(&self) -> Option<&InnerNode<K>> {
        match self {
            Node::Inner(inner) => Some(inner),
            Node::Leaf(_) => None,
        }
    }

    #[inline]
    pub fn as_leaf(&self) -> Option<&LeafNode<K>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Inner(_) => None,
        }
    }
}

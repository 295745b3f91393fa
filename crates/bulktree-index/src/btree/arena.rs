//! Arena-based storage for B+Tree nodes.
//!
//! Every node of a tree lives in one `Vec` owned by the arena. Nodes are
//! allocated sequentially and never freed individually; the whole tree is
//! released when the arena is dropped. Parent and sibling links are plain
//! [`NodeId`]s into the arena, so they never take part in deallocation.

use super::node::{InnerNode, LeafNode, Node};
use std::ops::{Index, IndexMut};

/// Index of a node in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contiguous node storage with a capacity shared by all nodes.
#[derive(Debug, Clone)]
pub struct NodeArena<K> {
    nodes: Vec<Node<K>>,
    /// Keys per inner node and slots per leaf.
    capacity: usize,
}

impl<K: Copy> NodeArena<K> {
    /// Creates an empty arena whose nodes hold `capacity` keys each.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            capacity,
        }
    }

    /// Creates an arena sized for a bulk build of `num_entries` entries.
    pub(crate) fn with_expected_entries(capacity: usize, num_entries: usize) -> Self {
        // Leaves dominate; inner nodes add roughly 1/capacity on top.
        let leaves = num_entries.div_ceil(capacity.max(1));
        let mut arena = Self::new(capacity);
        arena.nodes.reserve(leaves + leaves / capacity.max(1) + 2);
        arena
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of allocated nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<K>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i), node))
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(id.0)
    }

    #[inline]
    fn allocate(&mut self, node: Node<K>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Allocates an empty inner node under `parent`.
    pub(crate) fn allocate_inner(&mut self, parent: Option<NodeId>) -> NodeId {
        let node = Node::Inner(InnerNode::new(self.capacity, parent));
        self.allocate(node)
    }

    /// Allocates an empty, unlinked leaf.
    pub(crate) fn allocate_leaf(&mut self) -> NodeId {
        let node = Node::Leaf(LeafNode::new(self.capacity));
        self.allocate(node)
    }

    /// Returns the inner node at `id`.
    ///
    /// Callers only pass ids obtained from a parent link or from
    /// `allocate_inner`.
    ///
    /// # Panics
    ///
    /// Panics if `id` refers to a leaf.
    #[inline]
    pub(crate) fn inner(&self, id: NodeId) -> &InnerNode<K> {
        match &self[id] {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => unreachable!("node {id} is a leaf, expected inner node"),
        }
    }

    /// Mutable form of [`inner`](Self::inner).
    ///
    /// # Panics
    ///
    /// Panics if `id` refers to a leaf.
    #[inline]
    pub(crate) fn inner_mut(&mut self, id: NodeId) -> &mut InnerNode<K> {
        match &mut self[id] {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => unreachable!("node {id} is a leaf, expected inner node"),
        }
    }

    /// Returns the leaf at `id`.
    ///
    /// Callers only pass ids reached through descent or sibling links.
    ///
    /// # Panics
    ///
    /// Panics if `id` refers to an inner node.
    #[inline]
    pub(crate) fn leaf(&self, id: NodeId) -> &LeafNode<K> {
        match &self[id] {
            Node::Leaf(leaf) => leaf,
            Node::Inner(_) => unreachable!("node {id} is an inner node, expected leaf"),
        }
    }

    /// Mutable form of [`leaf`](Self::leaf).
    ///
    /// # Panics
    ///
    /// Panics if `id` refers to an inner node.
    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K> {
        match &mut self[id] {
            Node::Leaf(leaf) => leaf,
            Node::Inner(_) => unreachable!("node {id} is an inner node, expected leaf"),
        }
    }

    /// Links `right` after `left` in the leaf chain.
    pub(crate) fn link_leaves(&mut self, left: NodeId, right: NodeId) {
        self.leaf_mut(left).next = Some(right);
        self.leaf_mut(right).previous = Some(left);
    }

    /// Splits a full inner node for an append-only build and returns the new
    /// right sibling.
    ///
    /// The root is replaced by a new inner node when `node` has no parent; a
    /// full parent is split first. The key at `ceil(capacity / 2)` moves up
    /// to the parent, followed by the new sibling as the parent's rightmost
    /// child. Keys and children right of that key move to the sibling.
    ///
    /// Only valid when every key inserted afterwards is larger than all
    /// existing ones, since the new separator is always appended.
    pub(crate) fn split(&mut self, node: NodeId, root: &mut NodeId) -> NodeId {
        debug_assert!(self.inner(node).is_full(), "split of a non-full node {node}");

        let mut parent = match self.inner(node).parent {
            Some(parent) => parent,
            None => {
                let new_root = self.allocate_inner(None);
                self.inner_mut(new_root).add_child(node);
                self.inner_mut(node).parent = Some(new_root);
                *root = new_root;
                tracing::trace!(old_root = %node, new_root = %new_root, "tree grew by one level");
                new_root
            }
        };

        if self.inner(parent).is_full() {
            parent = self.split(parent, root);
        }

        let left_size = self.capacity.div_ceil(2);
        let (split_key, right_keys, right_children) = {
            let inner = self.inner_mut(node);
            let split_key = inner.remove_key(left_size);
            let right_keys = inner.keys.split_off(left_size);
            let right_children = inner.children.split_off(left_size + 1);
            (split_key, right_keys, right_children)
        };

        let right = self.allocate_inner(Some(parent));
        for &child in &right_children {
            self[child].set_parent(Some(right));
        }
        {
            let sibling = self.inner_mut(right);
            sibling.keys.extend(right_keys);
            sibling.children.extend(right_children);
        }

        let parent_node = self.inner_mut(parent);
        parent_node.add_key(split_key);
        parent_node.add_child(right);

        tracing::trace!(node = %node, sibling = %right, parent = %parent, "split inner node");
        right
    }
}

impl<K> Index<NodeId> for NodeArena<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl<K> IndexMut<NodeId> for NodeArena<K> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}

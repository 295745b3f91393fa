//! Structural invariant checks for a built tree.
//!
//! Used by tests and available to callers that want to verify a tree after
//! building it from untrusted input with `validate_input` disabled.

use super::arena::NodeId;
use super::node::Node;
use super::tree::BulkTree;
use bulktree_common::{BulkTreeError, Result};
use std::collections::HashSet;
use std::fmt::Debug;

fn corrupted(msg: String) -> BulkTreeError {
    BulkTreeError::Corrupted(msg)
}

impl<K: Ord + Copy + Debug> BulkTree<K> {
    /// Verifies the tree structure and the leaf chain.
    ///
    /// Checks:
    /// - inner nodes have one more child than keys, strictly increasing
    ///   separators, and children whose parent link points back;
    /// - every key reached by descent lies within its separators' bounds;
    /// - all indexed leaves sit at the same depth and none is an overflow
    ///   leaf;
    /// - no node exceeds the capacity;
    /// - the chain starts at the head, is linked in both directions, is
    ///   ordered, visits the indexed leaves in descent order, and holds
    ///   every entry exactly once;
/// - every leaf allocated in the arena is on the chain;
    /// - overflow leaves have no parent and only repeat the key that ends
    ///   the leaf before them.
    pub fn check_invariants(&self) -> Result<()> {
        let indexed = self.check_descent_structure()?;
        self.check_chain(&indexed)
    }

    /// Walks the tree from the root and returns the indexed leaves in key
    /// order.
    fn check_descent_structure(&self) -> Result<Vec<NodeId>> {
        let capacity = self.capacity();
        let mut leaves = Vec::new();
        let mut leaf_depth: Option<usize> = None;

        if self.arena[self.root].parent().is_some() {
            return Err(corrupted(format!("root {} has a parent", self.root)));
        }

        // (node, depth, lower bound inclusive, upper bound exclusive),
        // pushed right to left so leaves come out in key order.
        let mut stack: Vec<(NodeId, usize, Option<K>, Option<K>)> =
            vec![(self.root, 1, None, None)];

        while let Some((id, depth, lower, upper)) = stack.pop() {
            match &self.arena[id] {
                Node::Inner(inner) => {
                    let keys = inner.keys();
                    let children = inner.children();
                    if keys.len() > capacity {
                        return Err(corrupted(format!(
                            "inner node {id} holds {} keys (capacity {capacity})",
                            keys.len()
                        )));
                    }
                    if children.len() != keys.len() + 1 {
                        return Err(corrupted(format!(
                            "inner node {id} has {} keys but {} children",
                            keys.len(),
                            children.len()
                        )));
                    }
                    if keys.windows(2).any(|w| w[0] >= w[1]) {
                        return Err(corrupted(format!(
                            "inner node {id} separators not strictly increasing: {keys:?}"
                        )));
                    }
                    if let Some(&first) = keys.first() {
                        if lower.is_some_and(|lo| first < lo) {
                            return Err(corrupted(format!(
                                "inner node {id} separator {first:?} below bound {lower:?}"
                            )));
                        }
                    }
                    if let Some(&last) = keys.last() {
                        if upper.is_some_and(|hi| last >= hi) {
                            return Err(corrupted(format!(
                                "inner node {id} separator {last:?} not below bound {upper:?}"
                            )));
                        }
                    }

                    for (i, &child) in children.iter().enumerate().rev() {
                        if self.arena[child].parent() != Some(id) {
                            return Err(corrupted(format!(
                                "child {child} of {id} has parent {:?}",
                                self.arena[child].parent()
                            )));
                        }
                        let child_lower = if i == 0 { lower } else { Some(keys[i - 1]) };
                        let child_upper = keys.get(i).copied().or(upper);
                        stack.push((child, depth + 1, child_lower, child_upper));
                    }
                }
                Node::Leaf(leaf) => {
                    if leaf.is_overflow() {
                        return Err(corrupted(format!("overflow leaf {id} reachable by descent")));
                    }
                    if *leaf_depth.get_or_insert(depth) != depth {
                        return Err(corrupted(format!(
                            "leaf {id} at depth {depth}, expected {leaf_depth:?}"
                        )));
                    }
                    for entry in leaf.entries() {
                        let below = lower.is_some_and(|lo| entry.key < lo);
                        let above = upper.is_some_and(|hi| entry.key >= hi);
                        if below || above {
                            return Err(corrupted(format!(
                                "leaf {id} key {:?} outside [{lower:?}, {upper:?})",
                                entry.key
                            )));
                        }
                    }
                    leaves.push(id);
                }
            }
        }

        if leaf_depth != Some(self.height()) {
            return Err(corrupted(format!(
                "leaf depth {leaf_depth:?} does not match height {}",
                self.height()
            )));
        }
        Ok(leaves)
    }

    /// Walks the chain from the head and compares it with the leaves found
    /// by descent.
    fn check_chain(&self, indexed: &[NodeId]) -> Result<()> {
        let capacity = self.capacity();
        let reachable: HashSet<NodeId> = indexed.iter().copied().collect();
        let mut indexed_in_chain = Vec::with_capacity(indexed.len());
        let mut previous: Option<NodeId> = None;
        let mut last_key: Option<K> = None;
        let mut entries = 0usize;
        let mut overflow_leaves = 0usize;

        for (id, leaf) in self.leaves() {
            if leaf.previous() != previous {
                return Err(corrupted(format!(
                    "leaf {id} links back to {:?}, expected {previous:?}",
                    leaf.previous()
                )));
            }
            if leaf.entries().is_empty() {
                return Err(corrupted(format!("leaf {id} is empty")));
            }
            if leaf.num_keys() > capacity {
                return Err(corrupted(format!(
                    "leaf {id} holds {} entries (capacity {capacity})",
                    leaf.num_keys()
                )));
            }

            if leaf.is_overflow() {
                overflow_leaves += 1;
                if leaf.parent().is_some() {
                    return Err(corrupted(format!("overflow leaf {id} has a parent")));
                }
                if reachable.contains(&id) {
                    return Err(corrupted(format!("overflow leaf {id} is indexed")));
                }
                if leaf.entries().iter().any(|e| Some(e.key) != last_key) {
                    return Err(corrupted(format!(
                        "overflow leaf {id} holds keys other than {last_key:?}"
                    )));
                }
            } else {
                indexed_in_chain.push(id);
            }

            for entry in leaf.entries() {
                if last_key.is_some_and(|k| entry.key < k) {
                    return Err(corrupted(format!(
                        "chain out of order at leaf {id}: {:?} after {last_key:?}",
                        entry.key
                    )));
                }
                last_key = Some(entry.key);
            }

            entries += leaf.num_keys();
            previous = Some(id);
        }

        if indexed_in_chain != indexed {
            return Err(corrupted(format!(
                "chain visits indexed leaves {indexed_in_chain:?}, descent finds {indexed:?}"
            )));
        }
        if entries != self.len() {
            return Err(corrupted(format!(
                "chain holds {entries} entries, tree reports {}",
                self.len()
            )));
        }
        if overflow_leaves != self.stats().overflow_leaves {
            return Err(corrupted(format!(
                "chain holds {overflow_leaves} overflow leaves, tree reports {}",
                self.stats().overflow_leaves
            )));
        }

        let chained: HashSet<NodeId> = self.leaves().map(|(id, _)| id).collect();
        if let Some((id, _)) = self
            .arena
            .iter()
            .find(|(id, node)| node.is_leaf() && !chained.contains(id))
        {
            return Err(corrupted(format!("leaf {id} is not on the chain")));
        }
        Ok(())
    }
}

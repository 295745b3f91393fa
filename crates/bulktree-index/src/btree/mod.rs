//! Bulk-loaded, read-only B+Tree over sorted (key, row id) pairs.
//!
//! ## Construction
//!
//! The tree is built in one left-to-right pass over input that is already
//! sorted by key:
//!
//! ```text
//! sorted entries → [BulkBuilder] → NodeArena (inner nodes + leaf chain) → BulkTree
//! ```
//!
//! New leaves are appended as the rightmost child of the current parent. A
//! full parent is split so that only its right half is detached; the split
//! recurses upward and grows a new root when needed. Nothing is ever
//! inserted left of the cursor, so no descent happens while building.
//!
//! ## Leaf chain
//!
//! ```text
//!            [root: 5]
//!           /         \
//!   [1, 3] <-> [3] <-> [5]
//!  indexed   overflow  indexed
//! ```
//!
//! Leaves are doubly linked in key order. A duplicate run that would start
//! a new leaf goes to overflow leaves instead: they are chained like any
//! other leaf but have no parent and no separator. Descent therefore always
//! reaches the leaf holding a key's first occurrence, and the range queries
//! reach the remaining duplicates by walking the chain.
//!
//! ## Queries
//!
//! - `lookup`: row id of the first occurrence of a key.
//! - `greater_or_equal`: row id of the first entry with key `>=` the probe.
//! - `less_than`: row id of the entry just before the first key `>=` the
//!   probe, or `NotFound` / `EndOfKeyspace` at either end.
//!
//! ## Memory Layout
//!
//! All nodes live in one arena owned by the tree and are addressed by
//! [`NodeId`]. Parent and sibling links are ids, never owning references,
//! and the arena is released as a whole.

// Submodules
pub mod arena;
mod builder;
mod invariants;
pub mod iter;
pub mod node;
pub mod search;
pub mod tree;

// Re-exports for public API
pub use arena::{NodeArena, NodeId};
pub use iter::{Duplicates, Entries, Leaves};
pub use node::{InnerNode, LeafNode, Node};
pub use search::{exact_search, first_greater_or_equal, first_greater_than};
pub use tree::{build_bulk, BulkTree, LessThan, TreeStats};

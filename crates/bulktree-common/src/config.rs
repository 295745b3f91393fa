//! Configuration structures for the bulk-loaded index.

use crate::error::{BulkTreeError, Result};
use serde::{Deserialize, Serialize};

/// Default maximum number of keys (inner) or slots (leaf) per node.
pub const DEFAULT_NODE_CAPACITY: usize = 64;

/// Smallest capacity an inner split can work with: a full node needs a key
/// at `ceil(capacity / 2)` to promote.
pub const MIN_NODE_CAPACITY: usize = 2;

/// Largest accepted capacity. Every node reserves `capacity` slots up front.
pub const MAX_NODE_CAPACITY: usize = 1 << 16;

/// Build-time configuration carried by every tree.
///
/// The capacity is fixed when the tree is built and shared by all of its
/// nodes. Two trees built with different configurations never interfere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum keys per inner node and entries per leaf.
    pub node_capacity: usize,
    /// Verify that the input is sorted before building.
    pub validate_input: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            validate_input: true,
        }
    }
}

impl IndexConfig {
    /// Creates a configuration with the given node capacity.
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            node_capacity,
            ..Default::default()
        }
    }

    /// Checks that the configuration can build a well-formed tree.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_NODE_CAPACITY..=MAX_NODE_CAPACITY).contains(&self.node_capacity) {
            return Err(BulkTreeError::InvalidCapacity {
                capacity: self.node_capacity,
                min: MIN_NODE_CAPACITY,
                max: MAX_NODE_CAPACITY,
            });
        }
        Ok(())
    }

    /// Parses a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

//! Common types, errors, and configuration for the bulk-loaded B+ tree index.
//!
//! This crate provides shared definitions used by the index crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{IndexConfig, DEFAULT_NODE_CAPACITY, MAX_NODE_CAPACITY, MIN_NODE_CAPACITY};
pub use error::{BulkTreeError, Result};
pub use types::{first_unsorted, IndexEntry, RowId};

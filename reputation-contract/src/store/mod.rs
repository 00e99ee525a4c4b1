//! World state storage.
//!
//! A versioned key-value store. Every committed write stamps the key with the
//! store height at which it landed; transactions record the versions they read
//! and [`WorldState::commit`] refuses the write set if any of them moved.

mod composite;
pub mod file;
pub mod memory;
mod query;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use composite::{composite_key, composite_range, split_composite_key};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::Selector;

/// Error types for world state operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed to read or persist state
    #[error("Backend error: {0}")]
    Backend(String),

    /// A key read by the transaction changed before commit
    #[error("Read conflict on key {key:?}")]
    Conflict { key: String },

    /// Stored bytes could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed rich query
    #[error("Invalid query: {0}")]
    Query(String),

    /// Composite key attribute or layout is invalid
    #[error("Invalid composite key: {0}")]
    InvalidKey(String),
}

/// A stored value and the height it was last written at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned {
    pub value: Vec<u8>,
    pub version: u64,
}

/// Reads and buffered writes of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    /// Version observed per key read (`None` if the key was absent)
    pub reads: BTreeMap<String, Option<u64>>,
    /// New value per key (`None` deletes)
    pub writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl WriteSet {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// One page of a selector query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPage {
    pub records: Vec<(String, Vec<u8>)>,
    /// Number of records in this page
    pub fetched_count: usize,
    /// Key to resume after; empty when nothing was fetched from a fresh start
    pub bookmark: String,
}

/// Committed world state.
pub trait WorldState: Send + Sync {
    /// Read one key.
    fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError>;

    /// All entries with `start <= key < end`, in key order.
    fn range(&self, start: &str, end: &str) -> Result<Vec<(String, Versioned)>, StoreError>;

    /// JSON documents matching `selector`, in key order, after `bookmark`.
    ///
    /// A `page_size` of 0 returns every match.
    fn query(
        &self,
        selector: &Selector,
        page_size: usize,
        bookmark: &str,
    ) -> Result<QueryPage, StoreError>;

    /// Validate the read set and apply the writes atomically.
    ///
    /// Returns the store height after the commit.
    fn commit(&self, set: &WriteSet) -> Result<u64, StoreError>;

    /// Current store height.
    fn height(&self) -> Result<u64, StoreError>;
}

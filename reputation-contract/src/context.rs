//! Per-invocation transaction context.
//!
//! Reads go to committed state (or to this transaction's own pending writes)
//! and record the version they saw. Writes are buffered and only reach the
//! store through [`TransactionContext::into_write_set`] and a commit, so an
//! operation that fails part way leaves nothing behind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::store::{
    composite_key, composite_range, split_composite_key, QueryPage, Selector, StoreError,
    WorldState, WriteSet,
};

pub struct TransactionContext<'s> {
    store: &'s dyn WorldState,
    tx_id: String,
    set: WriteSet,
}

impl<'s> TransactionContext<'s> {
    pub fn new(store: &'s dyn WorldState, tx_id: impl Into<String>) -> Self {
        Self {
            store,
            tx_id: tx_id.into(),
            set: WriteSet::default(),
        }
    }

    /// Identifier of the running transaction.
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Read a key, seeing this transaction's own writes first.
    pub fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(pending) = self.set.writes.get(key) {
            return Ok(pending.clone());
        }

        let entry = self.store.get(key)?;
        self.set
            .reads
            .entry(key.to_string())
            .or_insert(entry.as_ref().map(|e| e.version));
        Ok(entry.map(|e| e.value))
    }

    pub fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key must not be empty".to_string()));
        }
        self.set.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    pub fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        self.set.writes.insert(key.to_string(), None);
        Ok(())
    }

    /// Read and decode a JSON value.
    pub fn get_json<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_state(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Serialization(format!("{key:?}: {e}"))),
            None => Ok(None),
        }
    }

    /// Encode and write a JSON value.
    pub fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.put_state(key, bytes)
    }

    pub fn create_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<String, StoreError> {
        composite_key(object_type, attributes)
    }

    pub fn split_composite_key(&self, key: &str) -> Result<(String, Vec<String>), StoreError> {
        split_composite_key(key)
    }

    /// Every entry under a composite key prefix, in key order.
    ///
    /// Pending writes of this transaction are merged over committed state.
    pub fn state_by_partial_composite_key(
        &mut self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let (start, end) = composite_range(object_type, attributes)?;

        let mut merged: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for (key, entry) in self.store.range(&start, &end)? {
            self.set
                .reads
                .entry(key.clone())
                .or_insert(Some(entry.version));
            merged.insert(key, entry.value);
        }

        let pending = self
            .set
            .writes
            .range(start.clone()..end.clone())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Vec<_>>();
        for (key, value) in pending {
            match value {
                Some(value) => merged.insert(key, value),
                None => merged.remove(&key),
            };
        }

        Ok(merged.into_iter().collect())
    }

    /// Run a rich query against committed state.
    ///
    /// Query results are not tracked for conflicts.
    pub fn query_with_pagination(
        &self,
        query: &str,
        page_size: usize,
        bookmark: &str,
    ) -> Result<QueryPage, StoreError> {
        let selector = Selector::parse(query)?;
        self.store.query(&selector, page_size, bookmark)
    }

    /// Hand over everything read and written, ready to commit.
    pub fn into_write_set(self) -> WriteSet {
        self.set
    }
}

//! In-memory world state.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::{QueryPage, Selector, StoreError, Versioned, WorldState, WriteSet};

/// Sorted entries plus the current height, shared by every backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StateTable {
    pub(crate) height: u64,
    pub(crate) entries: BTreeMap<String, Versioned>,
}

impl StateTable {
    pub(crate) fn get(&self, key: &str) -> Option<Versioned> {
        self.entries.get(key).cloned()
    }

    pub(crate) fn range(&self, start: &str, end: &str) -> Vec<(String, Versioned)> {
        if start > end {
            return Vec::new();
        }
        self.entries
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    pub(crate) fn query(&self, selector: &Selector, page_size: usize, bookmark: &str) -> QueryPage {
        let lower = if bookmark.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(bookmark)
        };
        let limit = if page_size == 0 { usize::MAX } else { page_size };

        let records: Vec<(String, Vec<u8>)> = self
            .entries
            .range::<str, _>((lower, Bound::Unbounded))
            .filter(|(_, entry)| selector.matches(&entry.value))
            .take(limit)
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect();

        let bookmark = records
            .last()
            .map(|(key, _)| key.clone())
            .unwrap_or_else(|| bookmark.to_string());

        QueryPage {
            fetched_count: records.len(),
            records,
            bookmark,
        }
    }

    /// Check the read set, then apply the writes at the next height.
    pub(crate) fn apply(&mut self, set: &WriteSet) -> Result<u64, StoreError> {
        for (key, seen) in &set.reads {
            let current = self.entries.get(key).map(|entry| entry.version);
            if current != *seen {
                return Err(StoreError::Conflict { key: key.clone() });
            }
        }

        if set.is_empty() {
            return Ok(self.height);
        }

        self.height += 1;
        for (key, value) in &set.writes {
            match value {
                Some(value) => {
                    self.entries.insert(
                        key.clone(),
                        Versioned {
                            value: value.clone(),
                            version: self.height,
                        },
                    );
                }
                None => {
                    self.entries.remove(key);
                }
            }
        }
        Ok(self.height)
    }
}

/// World state held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<StateTable>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StateTable>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Backend("state lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StateTable>, StoreError> {
        self.table
            .write()
            .map_err(|_| StoreError::Backend("state lock poisoned".to_string()))
    }
}

impl WorldState for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError> {
        Ok(self.read()?.get(key))
    }

    fn range(&self, start: &str, end: &str) -> Result<Vec<(String, Versioned)>, StoreError> {
        Ok(self.read()?.range(start, end))
    }

    fn query(
        &self,
        selector: &Selector,
        page_size: usize,
        bookmark: &str,
    ) -> Result<QueryPage, StoreError> {
        Ok(self.read()?.query(selector, page_size, bookmark))
    }

    fn commit(&self, set: &WriteSet) -> Result<u64, StoreError> {
        let height = self.write()?.apply(set)?;
        debug!(height, writes = set.writes.len(), "Committed write set");
        Ok(height)
    }

    fn height(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(key: &str, value: &[u8]) -> WriteSet {
        let mut set = WriteSet::default();
        set.writes.insert(key.to_string(), Some(value.to_vec()));
        set
    }

    #[test]
    fn test_commit_stamps_versions() {
        let store = MemoryStore::new();
        assert_eq!(store.commit(&put("a", b"1")).unwrap(), 1);
        assert_eq!(store.commit(&put("b", b"2")).unwrap(), 2);

        assert_eq!(store.get("a").unwrap().unwrap().version, 1);
        assert_eq!(store.get("b").unwrap().unwrap().version, 2);
        assert_eq!(store.height().unwrap(), 2);
    }

    #[test]
    fn test_stale_read_conflicts() {
        let store = MemoryStore::new();
        store.commit(&put("a", b"1")).unwrap();

        let mut stale = put("a", b"3");
        stale.reads.insert("a".to_string(), None);
        let err = store.commit(&stale).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { key } if key == "a"));
        assert_eq!(store.get("a").unwrap().unwrap().value, b"1".to_vec());
        assert_eq!(store.height().unwrap(), 1);
    }

    #[test]
    fn test_range_is_half_open() {
        let store = MemoryStore::new();
        for key in ["a", "b", "c"] {
            store.commit(&put(key, b"x")).unwrap();
        }
        let keys: Vec<String> = store
            .range("a", "c")
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(store.range("c", "a").unwrap().is_empty());
    }

    #[test]
    fn test_query_pages_with_bookmark() {
        let store = MemoryStore::new();
        for id in 1..=5 {
            store
                .commit(&put(&format!("e{id}"), br#"{"docType":"Evaluation"}"#))
                .unwrap();
        }
        store.commit(&put("svc", br#"{"docType":"Service"}"#)).unwrap();
        let selector = Selector::default().field("docType", "Evaluation");

        let first = store.query(&selector, 2, "").unwrap();
        assert_eq!(first.fetched_count, 2);
        assert_eq!(first.bookmark, "e2");

        let second = store.query(&selector, 2, &first.bookmark).unwrap();
        assert_eq!(second.records[0].0, "e3");

        let all = store.query(&selector, 0, "").unwrap();
        assert_eq!(all.fetched_count, 5);
    }
}

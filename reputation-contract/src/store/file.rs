//! World state persisted as a JSON snapshot.
//!
//! The whole table is rewritten on every commit through a temporary file and
//! a rename, so a crash leaves either the old or the new snapshot on disk.
//! Values are stored base64 encoded.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

use super::memory::StateTable;
use super::{QueryPage, Selector, StoreError, Versioned, WorldState, WriteSet};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    height: u64,
    entries: BTreeMap<String, SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    value: String,
    version: u64,
}

impl Snapshot {
    fn from_table(table: &StateTable) -> Self {
        Self {
            height: table.height,
            entries: table
                .entries
                .iter()
                .map(|(key, entry)| {
                    (
                        key.clone(),
                        SnapshotEntry {
                            value: STANDARD.encode(&entry.value),
                            version: entry.version,
                        },
                    )
                })
                .collect(),
        }
    }

    fn into_table(self) -> Result<StateTable, StoreError> {
        let mut entries = BTreeMap::new();
        for (key, entry) in self.entries {
            let value = STANDARD
                .decode(entry.value.as_bytes())
                .map_err(|e| StoreError::Serialization(format!("{key:?}: {e}")))?;
            entries.insert(
                key,
                Versioned {
                    value,
                    version: entry.version,
                },
            );
        }
        Ok(StateTable {
            height: self.height,
            entries,
        })
    }
}

/// World state backed by a snapshot file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: RwLock<StateTable>,
}

impl FileStore {
    /// Open the snapshot at `path`, starting empty if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let table = if path.exists() {
            let raw = fs::read(&path).map_err(|e| StoreError::Backend(e.to_string()))?;
            let snapshot: Snapshot = serde_json::from_slice(&raw)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            snapshot.into_table()?
        } else {
            StateTable::default()
        };

        info!(
            path = %path.display(),
            height = table.height,
            keys = table.entries.len(),
            "Opened world state"
        );

        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &StateTable) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&Snapshot::from_table(table))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::Backend(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StateTable>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Backend("state lock poisoned".to_string()))
    }
}

impl WorldState for FileStore {
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
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Backend("state lock poisoned".to_string()))?;

        // Apply to a copy so a failed write to disk leaves memory untouched
        let mut next = table.clone();
        let height = next.apply(set)?;
        if height != table.height {
            self.persist(&next)?;
            *table = next;
        }

        debug!(height, path = %self.path.display(), "Persisted world state");
        Ok(height)
    }

    fn height(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStore::open(&path).unwrap();
            let mut set = WriteSet::default();
            set.writes.insert("svc-1".to_string(), Some(br#"{"a":1}"#.to_vec()));
            set.writes.insert("\u{0}idx\u{0}".to_string(), Some(vec![0x00]));
            store.commit(&set).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.height().unwrap(), 1);
        assert_eq!(store.get("svc-1").unwrap().unwrap().value, br#"{"a":1}"#.to_vec());
        assert_eq!(store.get("\u{0}idx\u{0}").unwrap().unwrap().value, vec![0x00]);
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested/state.json")).unwrap();
        assert_eq!(store.height().unwrap(), 0);
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_conflict_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = FileStore::open(&path).unwrap();

        let mut set = WriteSet::default();
        set.reads.insert("k".to_string(), Some(7));
        set.writes.insert("k".to_string(), Some(b"v".to_vec()));
        assert!(store.commit(&set).is_err());
        assert!(!path.exists());
    }
}

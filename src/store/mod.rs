use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Collection key for the client list.
pub const CLIENTS_KEY: &str = "clients";
/// Collection key for the job list.
pub const JOBS_KEY: &str = "jobs";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create data directory {dir}")]
    CreateDir {
        dir: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize collection \"{key}\"")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write collection \"{key}\"")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Raw access to a named collection as one serialized blob.
///
/// Reads never fail: a collection that is absent or unreadable is reported
/// as absent and the caller treats it as empty. Writes replace the whole
/// blob in a single operation.
pub trait Store {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Deserialize the collection stored under `key`.
///
/// Absent or unparseable content degrades to an empty list. Corruption is
/// logged so the data loss is at least observable, but no error reaches the
/// caller.
pub fn load<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Vec<T> {
    let Some(raw) = store.read(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(err) => {
            warn!(key, error = %err, "stored collection is unparseable, treating as empty");
            Vec::new()
        }
    }
}

/// Serialize `records` and overwrite the collection stored under `key`.
pub fn save<T: Serialize>(store: &dyn Store, key: &str, records: &[T]) -> Result<(), StoreError> {
    let raw = serde_json::to_string(records).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.write(key, &raw)
}

/// Store backed by one `<key>.json` file per collection.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            dir: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(key, error = %err, "failed to read stored collection, treating as empty");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Write-then-rename so a crash mid-write never leaves a half-written
        // collection behind.
        let target = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let result = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &target));
        result.map_err(|source| StoreError::Write {
            key: key.to_string(),
            source,
        })
    }
}

/// In-memory store used by tests and anything else that wants repository
/// semantics without touching disk.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.lock().expect("store lock").get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .expect("store lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collection_loads_as_empty() {
        let store = MemoryStore::new();
        let records: Vec<String> = load(&store, CLIENTS_KEY);
        assert!(records.is_empty());
    }

    #[test]
    fn corrupt_collection_loads_as_empty() {
        let store = MemoryStore::new();
        store.write(JOBS_KEY, "{ not json [").unwrap();
        let records: Vec<String> = load(&store, JOBS_KEY);
        assert!(records.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryStore::new();
        let records = vec!["one".to_string(), "two".to_string()];
        save(&store, CLIENTS_KEY, &records).unwrap();
        assert_eq!(load::<String>(&store, CLIENTS_KEY), records);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            save(&store, CLIENTS_KEY, &[1u32, 2, 3]).unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(load::<u32>(&store, CLIENTS_KEY), vec![1, 2, 3]);
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(load::<u32>(&store, JOBS_KEY).is_empty());
    }

    #[test]
    fn file_store_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jobs.json"), "][").unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(load::<u32>(&store, JOBS_KEY).is_empty());
    }

    #[test]
    fn write_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        save(&store, JOBS_KEY, &[1u32]).unwrap();
        save(&store, JOBS_KEY, &[2u32, 3]).unwrap();
        assert_eq!(load::<u32>(&store, JOBS_KEY), vec![2, 3]);
    }
}

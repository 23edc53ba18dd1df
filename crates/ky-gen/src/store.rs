use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored payload was not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Flat key-value persistence contract the history runs on. Values are
/// whole serialized lists; there are no partial writes.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-per-key JSON store. Writes go through a temp file and a rename so
/// a crash mid-write never leaves a half-written list behind.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();

        fs::create_dir_all(&self.dir)?;
        let path = self.key_path(key);
        let temp_path = path.with_extension("tmp");

        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();

        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("history").unwrap(), None);

        store.set("history", "[]").unwrap();
        assert_eq!(store.get("history").unwrap().as_deref(), Some("[]"));

        store.remove("history").unwrap();
        assert_eq!(store.get("history").unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert_eq!(store.get("history").unwrap(), None);

        store.set("history", r#"[{"id":"a"}]"#).unwrap();
        assert_eq!(
            store.get("history").unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );

        // whole-value replace
        store.set("history", "[]").unwrap();
        assert_eq!(store.get("history").unwrap().as_deref(), Some("[]"));

        store.remove("history").unwrap();
        assert_eq!(store.get("history").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_missing_key_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.remove("nothing-here").unwrap();
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use ky_core::GeneratedAsset;
use crate::store::{KvStore, StoreError};

/// Oldest entries past the cap are dropped, not archived.
pub const HISTORY_CAP: usize = 20;

const HISTORY_KEY: &str = "history";
const COLLECTIONS_KEY: &str = "collections";

/// A named snapshot of a full history list, kept separately from the live
/// history so a wipe does not touch saved collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<GeneratedAsset>,
}

/// Capped, deduplicated, newest-first result history over a flat KV store.
/// Every mutation re-persists the whole list.
pub struct History<S: KvStore> {
    store: S,
}

impl<S: KvStore> History<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Vec<GeneratedAsset>, StoreError> {
        match self.store.get(HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, list: &[GeneratedAsset]) -> Result<(), StoreError> {
        self.store.set(HISTORY_KEY, &serde_json::to_string(list)?)
    }

    /// Prepend a result, newest first. Dedup is keyed on the model locator,
    /// not the prompt: identical prompts can legitimately yield different
    /// assets. A duplicate locator returns the existing entry unchanged.
    pub fn add(&self, asset: GeneratedAsset) -> Result<GeneratedAsset, StoreError> {
        let mut list = self.load()?;

        if let Some(existing) = list.iter().find(|a| a.model_ref == asset.model_ref) {
            return Ok(existing.clone());
        }

        list.insert(0, asset.clone());
        list.truncate(HISTORY_CAP);
        self.persist(&list)?;

        Ok(asset)
    }

    /// Remove by local id; no cascading effects
    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut list = self.load()?;
        list.retain(|a| a.id != id);
        self.persist(&list)
    }

    /// History wipe, persists the empty state
    pub fn clear(&self) -> Result<(), StoreError> {
        self.persist(&[])
    }

    // ---- collections ----

    pub fn list_collections(&self) -> Result<Vec<Collection>, StoreError> {
        match self.store.get(COLLECTIONS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist_collections(&self, collections: &[Collection]) -> Result<(), StoreError> {
        self.store
            .set(COLLECTIONS_KEY, &serde_json::to_string(collections)?)
    }

    /// Snapshot the current history under a new collection id.
    pub fn create_collection(&self, name: &str) -> Result<Collection, StoreError> {
        let collection = Collection {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            items: self.load()?,
        };

        let mut collections = self.list_collections()?;
        collections.insert(0, collection.clone());
        self.persist_collections(&collections)?;

        Ok(collection)
    }

    pub fn load_collection(&self, id: &str) -> Result<Option<Collection>, StoreError> {
        Ok(self.list_collections()?.into_iter().find(|c| c.id == id))
    }

    pub fn delete_collection(&self, id: &str) -> Result<(), StoreError> {
        let mut collections = self.list_collections()?;
        collections.retain(|c| c.id != id);
        self.persist_collections(&collections)
    }

    /// Replace the current history with a collection snapshot. Returns
    /// false when the collection does not exist.
    pub fn restore_collection(&self, id: &str) -> Result<bool, StoreError> {
        match self.load_collection(id)? {
            Some(collection) => {
                self.persist(&collection.items)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn history() -> History<MemoryStore> {
        History::new(MemoryStore::new())
    }

    fn asset(model_ref: &str) -> GeneratedAsset {
        GeneratedAsset::standard("a prompt", model_ref, None)
    }

    #[test]
    fn test_add_dedups_on_model_ref() {
        let history = history();

        let first = history.add(asset("https://x/m.glb")).unwrap();
        let second = history.add(asset("https://x/m.glb")).unwrap();

        // same entry back, store unchanged
        assert_eq!(second.id, first.id);
        assert_eq!(history.load().unwrap().len(), 1);
    }

    #[test]
    fn test_add_caps_at_twenty_newest_first() {
        let history = history();

        for i in 0..25 {
            history.add(asset(&format!("https://x/m{i}.glb"))).unwrap();
        }

        let list = history.load().unwrap();
        assert_eq!(list.len(), HISTORY_CAP);
        assert_eq!(list[0].model_ref, "https://x/m24.glb");
        assert_eq!(list[19].model_ref, "https://x/m5.glb");
        assert!(!list.iter().any(|a| a.model_ref == "https://x/m4.glb"));
    }

    #[test]
    fn test_remove_by_id() {
        let history = history();

        let kept = history.add(asset("https://x/a.glb")).unwrap();
        let removed = history.add(asset("https://x/b.glb")).unwrap();

        history.remove(&removed.id).unwrap();

        let list = history.load().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, kept.id);
    }

    #[test]
    fn test_clear_persists_empty_state() {
        let history = history();
        history.add(asset("https://x/a.glb")).unwrap();

        history.clear().unwrap();
        assert!(history.load().unwrap().is_empty());
    }

    #[test]
    fn test_collections_snapshot_and_restore() {
        let history = history();
        history.add(asset("https://x/a.glb")).unwrap();
        history.add(asset("https://x/b.glb")).unwrap();

        let saved = history.create_collection("favorites").unwrap();
        assert_eq!(saved.items.len(), 2);

        history.clear().unwrap();
        assert!(history.load().unwrap().is_empty());

        assert!(history.restore_collection(&saved.id).unwrap());
        assert_eq!(history.load().unwrap().len(), 2);

        history.delete_collection(&saved.id).unwrap();
        assert!(history.list_collections().unwrap().is_empty());
        assert!(!history.restore_collection(&saved.id).unwrap());
    }

    #[test]
    fn test_collection_load_does_not_touch_history() {
        let history = history();
        history.add(asset("https://x/a.glb")).unwrap();
        let saved = history.create_collection("one").unwrap();

        history.add(asset("https://x/b.glb")).unwrap();
        let loaded = history.load_collection(&saved.id).unwrap().unwrap();

        assert_eq!(loaded.items.len(), 1);
        assert_eq!(history.load().unwrap().len(), 2);
    }
}

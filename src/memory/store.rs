//! Memory store with optional file-based JSON persistence
//!
//! Directory layout when persistence is enabled:
//! ```text
//! ~/.titans/memory/
//! ├── episodic/
//! │   ├── mem-<uuid>.json
//! │   └── ...
//! └── semantic/
//!     ├── mem-<uuid>.json
//!     └── ...
//! ```

use super::types::{MemoryItem, MemoryType};
use crate::error::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Items in insertion order plus an id -> position index
#[derive(Default)]
struct MemoryIndex {
    items: Vec<MemoryItem>,
    by_id: HashMap<String, usize>,
}

impl MemoryIndex {
    fn insert(&mut self, item: MemoryItem) {
        self.by_id.insert(item.id.clone(), self.items.len());
        self.items.push(item);
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = format!("mem-{}", uuid::Uuid::new_v4());
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Process-wide store for episodic and semantic memory items
pub struct MemoryStore {
    index: Arc<RwLock<MemoryIndex>>,
    base_dir: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an in-memory store (nothing touches disk)
    pub fn new() -> Self {
        Self {
            index: Arc::new(RwLock::new(MemoryIndex::default())),
            base_dir: None,
        }
    }

    /// Open a persistent store rooted at `base_dir`, loading existing items
    pub async fn open(base_dir: PathBuf) -> std::io::Result<Self> {
        for memory_type in MemoryType::ALL {
            tokio::fs::create_dir_all(base_dir.join(memory_type.as_str())).await?;
        }

        let store = Self {
            index: Arc::new(RwLock::new(MemoryIndex::default())),
            base_dir: Some(base_dir),
        };

        store.load_from_disk().await;
        Ok(store)
    }

    /// Store a new item and return its freshly generated id
    pub async fn put(&self, memory_type: MemoryType, data: serde_json::Value) -> String {
        let item = {
            let mut index = self.index.write().await;
            let item = MemoryItem {
                id: index.fresh_id(),
                memory_type,
                data,
                created_at: Utc::now(),
            };
            index.insert(item.clone());
            item
        };

        tracing::debug!(id = %item.id, memory_type = %memory_type, "Stored memory item");

        self.persist_item(&item).await;
        item.id
    }

    /// Store a new item from a raw type tag
    ///
    /// Fails with `InvalidType` for anything but `episodic`/`semantic`,
    /// in which case nothing is stored.
    pub async fn put_tagged(&self, type_tag: &str, data: serde_json::Value) -> Result<String> {
        let memory_type: MemoryType = type_tag.parse()?;
        Ok(self.put(memory_type, data).await)
    }

    /// Fetch items of one type
    ///
    /// With an id, returns exactly that item if it exists with the
    /// requested type; otherwise `NotFound`. Without an id, returns all
    /// items of the type in insertion order.
    pub async fn get(&self, memory_type: MemoryType, id: Option<&str>) -> Result<Vec<MemoryItem>> {
        let index = self.index.read().await;

        match id {
            Some(id) => index
                .by_id
                .get(id)
                .map(|&pos| &index.items[pos])
                .filter(|item| item.memory_type == memory_type)
                .map(|item| vec![item.clone()])
                .ok_or_else(|| {
                    Error::NotFound(format!("{} memory '{}' does not exist", memory_type, id))
                }),
            None => Ok(index
                .items
                .iter()
                .filter(|item| item.memory_type == memory_type)
                .cloned()
                .collect()),
        }
    }

    /// Snapshot of every item in insertion order
    pub async fn all(&self) -> Vec<MemoryItem> {
        self.index.read().await.items.clone()
    }

    /// Number of stored items
    pub async fn len(&self) -> usize {
        self.index.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    async fn load_from_disk(&self) {
        let Some(base_dir) = &self.base_dir else {
            return;
        };

        let mut loaded: Vec<MemoryItem> = MemoryType::ALL
            .iter()
            .flat_map(|t| Self::load_json_files(&base_dir.join(t.as_str())))
            .collect();
        loaded.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut index = self.index.write().await;
        for item in loaded {
            if index.by_id.contains_key(&item.id) {
                tracing::warn!(id = %item.id, "Skipping duplicate memory item on disk");
                continue;
            }
            index.insert(item);
        }

        tracing::info!(count = index.items.len(), dir = %base_dir.display(), "Loaded memory items");
    }

    fn load_json_files(dir: &Path) -> Vec<MemoryItem> {
        let mut items = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
                }
                return items;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        items
    }

    async fn persist_item(&self, item: &MemoryItem) {
        let Some(base_dir) = &self.base_dir else {
            return;
        };

        let path = base_dir
            .join(item.memory_type.as_str())
            .join(format!("{}.json", item.id));
        match serde_json::to_string_pretty(item) {
            Ok(json) => {
                if let Err(e) = tokio::fs::write(&path, json).await {
                    tracing::warn!("Failed to persist memory item {}: {}", item.id, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize memory item {}: {}", item.id, e);
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_get_round_trip() {
        let store = MemoryStore::new();
        let data = json!({"event": "login", "user": {"name": "ada", "attempts": [1, 2]}});

        let id = store.put(MemoryType::Episodic, data.clone()).await;
        assert!(id.starts_with("mem-"));

        let items = store.get(MemoryType::Episodic, Some(&id)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].memory_type, MemoryType::Episodic);
        assert_eq!(items[0].data, data);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = MemoryStore::new();
        let mut ids = HashSet::new();
        for i in 0..200 {
            let memory_type = if i % 2 == 0 {
                MemoryType::Episodic
            } else {
                MemoryType::Semantic
            };
            assert!(ids.insert(store.put(memory_type, json!({"n": i})).await));
        }
        assert_eq!(store.len().await, 200);
    }

    #[tokio::test]
    async fn test_type_isolation() {
        let store = MemoryStore::new();
        let episodic = store.put(MemoryType::Episodic, json!({"event": "a"})).await;
        let semantic = store.put(MemoryType::Semantic, json!({"fact": "b"})).await;

        let items = store.get(MemoryType::Episodic, None).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items.iter().all(|i| i.memory_type == MemoryType::Episodic));

        let items = store.get(MemoryType::Semantic, None).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, semantic);

        // An existing id under the wrong type is not found
        let err = store
            .get(MemoryType::Semantic, Some(&episodic))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = MemoryStore::new();
        let first = store.put(MemoryType::Episodic, json!(1)).await;
        let second = store.put(MemoryType::Episodic, json!(2)).await;
        let third = store.put(MemoryType::Episodic, json!(3)).await;

        let ids: Vec<String> = store
            .get(MemoryType::Episodic, None)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = MemoryStore::new();
        let err = store
            .get(MemoryType::Episodic, Some("mem-missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_empty_type() {
        let store = MemoryStore::new();
        assert!(store.get(MemoryType::Semantic, None).await.unwrap().is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_tagged_invalid_type_stores_nothing() {
        let store = MemoryStore::new();
        let err = store
            .put_tagged("procedural", json!({"skill": "typing"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidType(_)));
        assert!(store.is_empty().await);

        let id = store.put_tagged("semantic", json!({"fact": "x"})).await.unwrap();
        assert_eq!(store.get(MemoryType::Semantic, Some(&id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_puts() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(MemoryType::Episodic, json!({"n": i})).await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(store.len().await, 50);
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let dir = TempDir::new().unwrap();

        let (first, second) = {
            let store = MemoryStore::open(dir.path().to_path_buf()).await.unwrap();
            let first = store.put(MemoryType::Episodic, json!({"event": "login"})).await;
            let second = store.put(MemoryType::Semantic, json!({"concept": "auth"})).await;
            (first, second)
        };

        assert!(dir.path().join("episodic").join(format!("{}.json", first)).exists());
        assert!(dir.path().join("semantic").join(format!("{}.json", second)).exists());

        let store = MemoryStore::open(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(store.len().await, 2);

        let items = store.get(MemoryType::Episodic, Some(&first)).await.unwrap();
        assert_eq!(items[0].data, json!({"event": "login"}));

        let all = store.all().await;
        assert_eq!(all[0].id, first);
        assert_eq!(all[1].id, second);
    }

    #[tokio::test]
    async fn test_load_skips_corrupt_files() {
        let dir = TempDir::new().unwrap();
        let episodic_dir = dir.path().join("episodic");
        std::fs::create_dir_all(&episodic_dir).unwrap();
        std::fs::write(episodic_dir.join("bad.json"), "not valid json").unwrap();
        std::fs::write(episodic_dir.join("notes.txt"), "ignored").unwrap();

        let store = MemoryStore::open(dir.path().to_path_buf()).await.unwrap();
        assert!(store.is_empty().await);
    }
}

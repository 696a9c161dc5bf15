//! Durable key-value persistence and the task-list accessor built on it.
//!
//! Storage is two named collections under fixed keys: the task list and the
//! deleted-id tombstone list, each JSON-serialized. Reads never fail the
//! caller: an absent or malformed collection is treated as empty (logged at
//! warn level). Writes replace the whole collection atomically.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

use crate::task::Task;

/// Storage key for the JSON-serialized task list.
pub const TASKS_KEY: &str = "tasks";
/// Storage key for the JSON-serialized deleted-id list.
pub const DELETED_IDS_KEY: &str = "deletedTaskIds";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable string-keyed storage, get/set semantics. An absent key reads as
/// `None`. A `set` must be atomic for the single key it touches: a
/// subsequent `get` within the same process observes either the old or the
/// new value, never a partial write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}

/// In-memory store. Used in tests and wherever durable storage is not
/// available (everything reads as absent on restart).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

/// File-backed store: one JSON object file mapping keys to their serialized
/// values. Writes go through a temp file and rename, so a crash mid-write
/// leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes the read-modify-write of the backing file across keys.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => Ok(map),
                Err(e) => {
                    log::warn!(
                        "store file {} is malformed, treating as empty: {e}",
                        self.path.display()
                    );
                    Ok(HashMap::new())
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut map = self.read_map().await?;
        Ok(map.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        let serialized = serde_json::to_string(&map)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serialized).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Accessor for the two persisted collections.
///
/// Read paths degrade to empty instead of failing (a corrupt task list must
/// not brick the app); write paths surface [`StoreError`] to the caller.
pub struct TaskStore<S> {
    store: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(store: S) -> Self {
        TaskStore { store }
    }

    pub async fn load_tasks(&self) -> Vec<Task> {
        self.load_collection(TASKS_KEY).await
    }

    pub async fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(tasks)?;
        self.store.set(TASKS_KEY, serialized).await
    }

    pub async fn load_deleted_ids(&self) -> Vec<i64> {
        self.load_collection(DELETED_IDS_KEY).await
    }

    pub async fn save_deleted_ids(&self, ids: &[i64]) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(ids)?;
        self.store.set(DELETED_IDS_KEY, serialized).await
    }

    /// Append a tombstone, skipping the write if the id is already recorded.
    pub async fn append_deleted_id(&self, id: i64) -> Result<(), StoreError> {
        let mut ids = self.load_deleted_ids().await;
        if !ids.contains(&id) {
            ids.push(id);
            self.save_deleted_ids(&ids).await?;
        }
        Ok(())
    }

    async fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("stored data under key '{key}' is malformed, treating as empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("failed to read key '{key}', treating as empty: {e}");
                Vec::new()
            }
        }
    }
}

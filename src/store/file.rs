//! JSON-file store backend
//!
//! Keeps the whole table in memory and rewrites a single JSON file on
//! every mutation, reloading it on open. The table is small (one
//! record per room), so whole-file rewrites stay cheap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionStore, StoreResult};
use crate::directory::SessionRecord;

pub struct JsonFileStore {
    path: PathBuf,
    table: RwLock<HashMap<String, SessionRecord>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing table. Records
    /// are keyed by their room id.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let table = Self::load(&path)?;
        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    fn load(path: &Path) -> StoreResult<HashMap<String, SessionRecord>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let content = std::fs::read_to_string(path)?;
        let records: Vec<SessionRecord> = serde_json::from_str(&content)?;
        Ok(records.into_iter().map(|r| (r.id.clone(), r)).collect())
    }

    fn save(&self, table: &HashMap<String, SessionRecord>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let records: Vec<&SessionRecord> = table.values().collect();
        let content = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<SessionRecord>> {
        Ok(self.table.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, record: SessionRecord) -> StoreResult<()> {
        let mut table = self.table.write().await;
        table.insert(key.to_string(), record);
        self.save(&table)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut table = self.table.write().await;
        if table.remove(key).is_some() {
            self.save(&table)?;
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<SessionRecord>> {
        Ok(self.table.read().await.values().cloned().collect())
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut table = self.table.write().await;
        table.clear();
        self.save(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::UserEntry;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_round_trip_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("directory.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            let mut record = SessionRecord::new("r1");
            record.connections = 2;
            record.users.push(UserEntry::joined("alice"));
            store.put("r1", record).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        let record = reopened.get("r1").await.unwrap().unwrap();
        assert_eq!(record.connections, 2);
        assert_eq!(record.users[0].username, "alice");
    }

    #[tokio::test]
    async fn test_open_without_file() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("missing.json")).unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("table.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.put("r1", SessionRecord::new("r1")).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_delete_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("directory.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.put("r1", SessionRecord::new("r1")).await.unwrap();
            store.put("r2", SessionRecord::new("r2")).await.unwrap();
            store.delete("r1").await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get("r1").await.unwrap().is_none());
        assert!(reopened.get("r2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("directory.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.put("r1", SessionRecord::new("r1")).await.unwrap();
            store.clear().await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.list().await.unwrap().is_empty());
    }
}

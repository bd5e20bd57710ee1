//! In-memory store backend
//!
//! Backs the directory in tests and in deployments that accept losing
//! the presence table on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionStore, StoreResult};
use crate::directory::SessionRecord;

#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<SessionRecord>> {
        Ok(self.table.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, record: SessionRecord) -> StoreResult<()> {
        self.table.write().await.insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.table.write().await.remove(key);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<SessionRecord>> {
        Ok(self.table.read().await.values().cloned().collect())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.table.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        assert!(store.get("r1").await.unwrap().is_none());

        store.put("r1", SessionRecord::new("r1")).await.unwrap();
        assert_eq!(store.get("r1").await.unwrap().unwrap().id, "r1");

        store.delete("r1").await.unwrap();
        assert!(store.get("r1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_noop() {
        let store = MemoryStore::new();
        store.delete("ghost").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let store = MemoryStore::new();
        store.put("a", SessionRecord::new("a")).await.unwrap();
        store.put("b", SessionRecord::new("b")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let store = MemoryStore::new();
        store.put("r1", SessionRecord::new("r1")).await.unwrap();

        let mut updated = SessionRecord::new("r1");
        updated.connections = 5;
        store.put("r1", updated).await.unwrap();

        assert_eq!(store.get("r1").await.unwrap().unwrap().connections, 5);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}

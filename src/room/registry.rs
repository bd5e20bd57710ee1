//! Room Registry
//!
//! Routes room ids to live hub instances. Hubs are created on first
//! use and stay resident for the life of the process; their durable
//! trace lives in the directory's store, not here.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::hub::RoomHub;
use crate::directory::SessionDirectory;

pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<RoomHub>>>,
    directory: Arc<SessionDirectory>,
}

impl RoomRegistry {
    pub fn new(directory: Arc<SessionDirectory>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            directory,
        }
    }

    /// Existing hub for `room_id`, or a freshly created one.
    pub async fn room(&self, room_id: &str) -> Arc<RoomHub> {
        if let Some(hub) = self.rooms.read().await.get(room_id) {
            return Arc::clone(hub);
        }

        let mut rooms = self.rooms.write().await;
        let hub = rooms.entry(room_id.to_string()).or_insert_with(|| {
            tracing::debug!(room = %room_id, "Created room hub");
            Arc::new(RoomHub::new(room_id, Arc::clone(&self.directory)))
        });
        Arc::clone(hub)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registry() -> RoomRegistry {
        RoomRegistry::new(Arc::new(SessionDirectory::new(Arc::new(
            MemoryStore::new(),
        ))))
    }

    #[tokio::test]
    async fn test_same_id_yields_same_hub() {
        let registry = registry();
        let a = registry.room("r1").await;
        let b = registry.room("r1").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_ids_yield_distinct_hubs() {
        let registry = registry();
        let a = registry.room("r1").await;
        let b = registry.room("r2").await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.room_id(), "r1");
        assert_eq!(b.room_id(), "r2");
    }
}

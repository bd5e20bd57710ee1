//! Directory service
//!
//! One instance per process. Room hubs call [`SessionDirectory::apply`]
//! for joins, leaves, and tool changes; the directory control endpoint
//! routes its mutations through the same call, so both paths share one
//! contract.
//!
//! Mutations of a given room's record run under a per-record lock:
//! load → mutate → persist is atomic per room id, and notifications
//! for different rooms proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex, RwLock};
use uuid::Uuid;

use super::types::{DirectoryMessage, DirectoryUpdate, SessionRecord, UserEntry};
use crate::store::{SessionStore, StoreResult};

pub struct SessionDirectory {
    store: Arc<dyn SessionStore>,
    /// Directory-room subscribers: connection id → outbound JSON sender
    subscribers: RwLock<HashMap<String, mpsc::UnboundedSender<String>>>,
    /// Per-record mutation locks, keyed by room id
    record_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionDirectory {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            subscribers: RwLock::new(HashMap::new()),
            record_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Apply one presence mutation, persist it, and push the refreshed
    /// snapshot to every subscriber. Returns the full list after the
    /// mutation.
    pub async fn apply(&self, update: DirectoryUpdate) -> StoreResult<Vec<SessionRecord>> {
        let lock = self.record_lock(update.room_id()).await;
        let guard = lock.lock().await;
        let result = self.mutate(update).await;
        drop(guard);
        result?;

        let sessions = self.store.list().await?;
        self.broadcast(&sessions).await;
        Ok(sessions)
    }

    async fn mutate(&self, update: DirectoryUpdate) -> StoreResult<()> {
        match update {
            DirectoryUpdate::Join {
                id,
                connections,
                username,
            } => {
                let mut record = self
                    .store
                    .get(&id)
                    .await?
                    .unwrap_or_else(|| SessionRecord::new(&id));
                record.connections = connections;
                // A re-join replaces the stale entry rather than appending
                record.users.retain(|u| u.username != username);
                record.users.insert(0, UserEntry::joined(username));
                self.store.put(&id, record).await?;
            }
            DirectoryUpdate::Leave {
                id,
                connections,
                username,
            } => {
                // Leave for a room that was never recorded is a no-op
                let Some(mut record) = self.store.get(&id).await? else {
                    return Ok(());
                };
                record.connections = connections;
                if let Some(user) = record.user_mut(&username) {
                    user.present = false;
                    user.left_at = Some(Utc::now());
                }
                self.store.put(&id, record).await?;
            }
            DirectoryUpdate::ChangeTool {
                id,
                connections,
                username,
                tool_name,
            } => {
                let mut record = self
                    .store
                    .get(&id)
                    .await?
                    .unwrap_or_else(|| SessionRecord::new(&id));
                record.connections = connections;
                if let Some(user) = record.user_mut(&username) {
                    user.current_tool = Some(tool_name);
                }
                self.store.put(&id, record).await?;
            }
            DirectoryUpdate::Delete { id } => {
                self.store.delete(&id).await?;
            }
        }
        Ok(())
    }

    /// Every record currently in the store, unordered across rooms.
    /// Rooms with zero present users persist until explicitly deleted.
    pub async fn list(&self) -> StoreResult<Vec<SessionRecord>> {
        self.store.list().await
    }

    /// Last-known record for one room.
    pub async fn record(&self, room_id: &str) -> StoreResult<Option<SessionRecord>> {
        self.store.get(room_id).await
    }

    /// Wipe the entire table and push an empty snapshot. An
    /// administrative escape hatch, not part of the normal flow.
    pub async fn clear(&self) -> StoreResult<Vec<SessionRecord>> {
        self.store.clear().await?;
        let sessions = Vec::new();
        self.broadcast(&sessions).await;
        Ok(sessions)
    }

    /// Attach a directory subscriber. The current snapshot is pushed
    /// immediately, independent of mutation-driven broadcasts.
    pub async fn subscribe(&self, sender: mpsc::UnboundedSender<String>) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();

        let sessions = self.store.list().await?;
        if let Some(payload) = snapshot_payload(&sessions) {
            let _ = sender.send(payload);
        }

        self.subscribers.write().await.insert(id.clone(), sender);
        tracing::info!(connection_id = %id, "Directory subscriber attached");
        Ok(id)
    }

    pub async fn unsubscribe(&self, id: &str) {
        self.subscribers.write().await.remove(id);
        tracing::info!(connection_id = %id, "Directory subscriber detached");
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Fire-and-forget snapshot push; a slow or dead subscriber only
    /// affects its own channel.
    async fn broadcast(&self, sessions: &[SessionRecord]) {
        let Some(payload) = snapshot_payload(sessions) else {
            return;
        };

        let subscribers = self.subscribers.read().await;
        for sender in subscribers.values() {
            let _ = sender.send(payload.clone());
        }

        tracing::trace!(
            sessions = sessions.len(),
            subscribers = subscribers.len(),
            "Broadcast directory snapshot"
        );
    }

    async fn record_lock(&self, room_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.record_locks.lock().await;
        Arc::clone(
            locks
                .entry(room_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

fn snapshot_payload(sessions: &[SessionRecord]) -> Option<String> {
    let message = DirectoryMessage::SessionUpdate {
        sessions: sessions.to_vec(),
    };
    match serde_json::to_string(&message) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize directory snapshot");
            None
        }
    }
}

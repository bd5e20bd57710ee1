//! Durable Session Store
//!
//! The directory persists one [`SessionRecord`] per room through this
//! capability. Backends only provide opaque `get/put/delete/list`;
//! the directory layers its own per-record locking on top, so a
//! backend does not need to serialize mutations itself.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::directory::SessionRecord;

/// Errors that can occur in a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value persistence for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<SessionRecord>>;

    /// Insert or replace the record under `key`.
    async fn put(&self, key: &str, record: SessionRecord) -> StoreResult<()>;

    /// Remove the record under `key`; absent keys are a no-op.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Every record currently stored, in no particular order.
    async fn list(&self) -> StoreResult<Vec<SessionRecord>>;

    /// Remove everything.
    async fn clear(&self) -> StoreResult<()>;
}

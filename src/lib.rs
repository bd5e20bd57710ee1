//! # Atelier
//!
//! Real-time fan-out and presence coordination for collaborative
//! studio sessions.
//!
//! ## Features
//!
//! - **Binary wire protocol**: compact tagged frames for drawing,
//!   text, file, and cursor events
//! - **Room fan-out**: raw frames are relayed to room peers with the
//!   sender's identity appended, without decoding the payload
//! - **Presence directory**: a singleton, durable table of who is in
//!   which room, re-broadcast to subscribers after every change
//! - **Pluggable persistence**: in-memory or JSON-file store behind a
//!   small key-value trait
//!
//! ## Modules
//!
//! - [`wire`]: binary codec for event frames
//! - [`room`]: per-room connection hubs and the room registry
//! - [`directory`]: the singleton session directory
//! - [`store`]: durable key-value persistence for session records
//! - [`api`]: HTTP control surface with Axum
//! - [`websocket`]: WebSocket upgrade handlers and connection loops

pub mod api;
pub mod config;
pub mod directory;
pub mod room;
pub mod store;
pub mod websocket;
pub mod wire;

// Re-export top-level types for convenience
pub use wire::{append_sender, ClientEvent, ServerEvent, WireError, WireReader, WireWriter};

pub use room::{ConnectionId, ConnectionState, RoomError, RoomHub, RoomRegistry};

pub use directory::{
    DirectoryMessage, DirectoryUpdate, SessionDirectory, SessionRecord, UserEntry,
};

pub use store::{JsonFileStore, MemoryStore, SessionStore, StoreError, StoreResult};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig, StoreConfig};

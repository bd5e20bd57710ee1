//! Room Hub
//!
//! Owns one room's live connections and per-connection state,
//! dispatches inbound frames by their leading tag, and reports joins,
//! leaves, and tool changes to the session directory.
//!
//! Relayed frames are never decoded: the hub appends the sender's
//! connection id and username to the raw bytes and fans the result
//! out to every other connection in the room.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::directory::{DirectoryUpdate, SessionDirectory, SessionRecord};
use crate::store::StoreError;
use crate::wire::{self, tag, ClientEvent};

/// Unique identifier for a room connection
pub type ConnectionId = String;

/// State carried by one live connection, created at accept time and
/// mutated only by the connection's own events.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    pub username: String,
    pub current_tool: String,
}

/// Handle for one live connection: outbound frame channel plus state
struct ConnectionHandle {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    state: ConnectionState,
}

/// Errors that can occur in a room hub
#[derive(Debug, Error)]
pub enum RoomError {
    /// Connection arrived without the required username parameter
    #[error("missing username")]
    MissingUsername,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RoomHub {
    room_id: String,
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    directory: Arc<SessionDirectory>,
}

impl RoomHub {
    pub fn new(room_id: impl Into<String>, directory: Arc<SessionDirectory>) -> Self {
        Self {
            room_id: room_id.into(),
            connections: RwLock::new(HashMap::new()),
            directory,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Accept a connection. A missing or empty username is a hard
    /// rejection: no state is created and the caller closes the
    /// socket. On success the directory is notified of the join with
    /// the current live count.
    pub async fn accept(
        &self,
        sender: mpsc::UnboundedSender<Vec<u8>>,
        username: Option<String>,
        current_tool: Option<String>,
    ) -> Result<ConnectionId, RoomError> {
        let username = username
            .filter(|u| !u.is_empty())
            .ok_or(RoomError::MissingUsername)?;

        let id = Uuid::new_v4().to_string();
        let state = ConnectionState {
            username: username.clone(),
            current_tool: current_tool.unwrap_or_default(),
        };

        let live = {
            let mut connections = self.connections.write().await;
            connections.insert(id.clone(), ConnectionHandle { sender, state });
            connections.len() as u32
        };

        tracing::info!(
            room = %self.room_id,
            connection_id = %id,
            username = %username,
            "Connection joined"
        );

        self.notify_directory(DirectoryUpdate::Join {
            id: self.room_id.clone(),
            connections: live,
            username,
        })
        .await;

        Ok(id)
    }

    /// Classify one inbound frame by its leading tag and dispatch it.
    /// Every failure here is per-event: the frame is dropped and the
    /// connection stays open.
    pub async fn handle_frame(&self, connection_id: &str, frame: &[u8]) {
        let lead = match wire::peek_tag(frame) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(
                    room = %self.room_id,
                    connection_id = %connection_id,
                    error = %e,
                    "Discarded malformed frame"
                );
                return;
            }
        };

        match lead {
            tag::CHANGE_TOOL => self.handle_change_tool(connection_id, frame).await,
            tag::TEXT | tag::WRITE_FILE | tag::PALETTE_IMAGE_UPLOAD | tag::CURSOR_UPDATE => {
                self.relay(connection_id, frame).await
            }
            other => {
                tracing::debug!(
                    room = %self.room_id,
                    tag = other,
                    "No handler for message kind"
                );
            }
        }
    }

    /// Tool changes update the sender's own state and flow to the
    /// directory; peers only see them through the next snapshot.
    async fn handle_change_tool(&self, connection_id: &str, frame: &[u8]) {
        let tool_name = match ClientEvent::decode(frame) {
            Ok(ClientEvent::ChangeTool { tool_name }) => tool_name,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(
                    room = %self.room_id,
                    connection_id = %connection_id,
                    error = %e,
                    "Discarded malformed changeTool frame"
                );
                return;
            }
        };

        let (username, live) = {
            let mut connections = self.connections.write().await;
            let live = connections.len() as u32;
            match connections.get_mut(connection_id) {
                Some(handle) => {
                    handle.state.current_tool = tool_name.clone();
                    (handle.state.username.clone(), live)
                }
                // Events from a connection that never joined are dropped
                None => return,
            }
        };

        self.notify_directory(DirectoryUpdate::ChangeTool {
            id: self.room_id.clone(),
            connections: live,
            username,
            tool_name,
        })
        .await;
    }

    /// Fan the raw frame out to every other connection, with the
    /// sender's identity appended. The payload is not decoded.
    async fn relay(&self, connection_id: &str, frame: &[u8]) {
        let connections = self.connections.read().await;
        let Some(sender_handle) = connections.get(connection_id) else {
            return;
        };

        let relayed = match wire::append_sender(
            frame,
            connection_id,
            &sender_handle.state.username,
        ) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    room = %self.room_id,
                    connection_id = %connection_id,
                    error = %e,
                    "Discarded frame that could not be re-framed"
                );
                return;
            }
        };

        for (id, handle) in connections.iter() {
            if id == connection_id {
                continue;
            }
            // Fire and forget; a dead peer is torn down by its own task
            let _ = handle.sender.send(relayed.clone());
        }
    }

    /// Remove the connection and report the leave with the
    /// post-disconnect live count.
    pub async fn disconnect(&self, connection_id: &str) {
        let (removed, live) = {
            let mut connections = self.connections.write().await;
            let removed = connections.remove(connection_id);
            (removed, connections.len() as u32)
        };

        let Some(handle) = removed else { return };

        tracing::info!(
            room = %self.room_id,
            connection_id = %connection_id,
            username = %handle.state.username,
            "Connection left"
        );

        self.notify_directory(DirectoryUpdate::Leave {
            id: self.room_id.clone(),
            connections: live,
            username: handle.state.username,
        })
        .await;
    }

    /// Last-known durable record for this room, by delegation to the
    /// directory's store.
    pub async fn record(&self) -> Result<Option<SessionRecord>, RoomError> {
        Ok(self.directory.record(&self.room_id).await?)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn current_tool(&self, connection_id: &str) -> Option<String> {
        self.connections
            .read()
            .await
            .get(connection_id)
            .map(|h| h.state.current_tool.clone())
    }

    /// A hung or failed directory call delays that event's visibility
    /// in the listing; it never takes the room down.
    async fn notify_directory(&self, update: DirectoryUpdate) {
        if let Err(e) = self.directory.apply(update).await {
            tracing::warn!(
                room = %self.room_id,
                error = %e,
                "Directory notification failed"
            );
        }
    }
}

//! Presence Types
//!
//! The durable data model behind the session directory, plus the wire
//! shapes of its update requests and its subscriber payload. All JSON
//! field names follow the client contract (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's presence inside a room.
///
/// Created on a join notification; `present` flips to false and
/// `left_at` is stamped on leave. The entry is never deleted on its
/// own, only together with the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntry {
    pub username: String,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_at: Option<DateTime<Utc>>,
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_tool: Option<String>,
}

impl UserEntry {
    /// A freshly joined, present user.
    pub fn joined(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            joined_at: Utc::now(),
            left_at: None,
            present: true,
            current_tool: None,
        }
    }
}

/// Last-known presence of one collaboration room.
///
/// `users` is ordered most-recently-joined-first and holds at most one
/// entry per username; a re-join replaces the stale entry.
/// `connections` is the live count as last reported by a hub;
/// whichever notification lands last overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub connections: u32,
    pub users: Vec<UserEntry>,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connections: 0,
            users: Vec::new(),
        }
    }

    /// Mutable entry for `username`, if one exists.
    pub fn user_mut(&mut self, username: &str) -> Option<&mut UserEntry> {
        self.users.iter_mut().find(|u| u.username == username)
    }
}

/// A presence mutation, as issued by room hubs and accepted by the
/// directory control endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum DirectoryUpdate {
    Join {
        id: String,
        connections: u32,
        username: String,
    },
    Leave {
        id: String,
        connections: u32,
        username: String,
    },
    ChangeTool {
        id: String,
        connections: u32,
        username: String,
        tool_name: String,
    },
    Delete {
        id: String,
    },
}

impl DirectoryUpdate {
    /// Room id the mutation targets.
    pub fn room_id(&self) -> &str {
        match self {
            DirectoryUpdate::Join { id, .. }
            | DirectoryUpdate::Leave { id, .. }
            | DirectoryUpdate::ChangeTool { id, .. }
            | DirectoryUpdate::Delete { id } => id,
        }
    }
}

/// Messages pushed to directory subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DirectoryMessage {
    /// Full snapshot of every known session record
    SessionUpdate { sessions: Vec<SessionRecord> },
}

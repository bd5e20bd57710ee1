//! Collaboration Rooms
//!
//! One [`RoomHub`] per room owns the live connection set and relays
//! binary frames between peers; the [`RoomRegistry`] routes room ids
//! to hub instances, creating them on demand.

mod hub;
mod registry;

pub use hub::{ConnectionId, ConnectionState, RoomError, RoomHub};
pub use registry::RoomRegistry;

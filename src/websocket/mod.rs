//! WebSocket Surface
//!
//! Upgrade endpoints and per-connection loops. A collaboration socket
//! speaks the binary wire protocol both ways; the directory socket is
//! outbound-only JSON snapshots.
//!
//! ## Architecture
//!
//! Each accepted socket is split into a send task (drains the
//! connection's outbound channel) and a receive task (feeds frames to
//! the room hub); whichever finishes first tears the other down, then
//! the connection is unregistered.

mod handler;

pub use handler::{directory_ws_handler, room_ws_handler, ConnectParams};

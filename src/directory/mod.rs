//! Session Directory
//!
//! The singleton presence layer: a durable table with one
//! [`SessionRecord`] per collaboration room, mutated by notifications
//! from every room hub, and a subscriber set that receives a full
//! JSON snapshot after each mutation.

mod service;
mod types;

pub use service::SessionDirectory;
pub use types::{DirectoryMessage, DirectoryUpdate, SessionRecord, UserEntry};

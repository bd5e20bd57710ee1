//! Data Transfer Objects
//!
//! Response types for the control endpoints. Mutation request bodies
//! use [`crate::directory::DirectoryUpdate`] directly, since the core
//! owns that contract.

use serde::Serialize;

use crate::directory::SessionRecord;

/// Directory listing response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionRecord>,
}

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Store status: "ok" or "error"
    pub store: String,
    /// Seconds since server start
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
}

//! Application State
//!
//! Shared state accessible by all handlers, wrapped in Arc for
//! thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::directory::SessionDirectory;
use crate::room::RoomRegistry;
use crate::store::SessionStore;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Collaboration room hubs, created on demand
    pub rooms: Arc<RoomRegistry>,
    /// The singleton session directory
    pub directory: Arc<SessionDirectory>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, config: ApiConfig) -> Self {
        let directory = Arc::new(SessionDirectory::new(store));
        Self {
            rooms: Arc::new(RoomRegistry::new(Arc::clone(&directory))),
            directory,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8086,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

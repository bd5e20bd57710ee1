//! Atelier Server
//!
//! Run with: cargo run --bin atelier-server
//!
//! # Configuration
//!
//! Loaded from a TOML file (see `Config::load_default` for the search
//! paths) with environment variable overrides:
//! - `ATELIER_HOST`: Host to bind to (default: 0.0.0.0)
//! - `ATELIER_PORT`: Port to listen on (default: 8086)
//! - `ATELIER_STORE_BACKEND`: "file" or "memory" (default: file)
//! - `ATELIER_STORE_PATH`: Directory table location
//! - `RUST_LOG`: Log level filter (default: atelier=info)

use std::sync::Arc;

use atelier::api::{serve, ApiConfig, AppState};
use atelier::config::Config;
use atelier::store::{JsonFileStore, MemoryStore, SessionStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();

    init_tracing(&config);

    tracing::info!("Starting Atelier server v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config)?;
    let api_config = ApiConfig::new(config.api.host.clone(), config.api.port);

    let state = AppState::new(store, api_config.clone());

    tracing::info!("Starting server on {}", api_config.addr());
    serve(state, &api_config).await?;

    tracing::info!("Atelier server stopped");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "atelier={},tower_http=debug",
            config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>, Box<dyn std::error::Error>> {
    match config.store.backend.as_str() {
        "memory" => {
            tracing::info!("Using in-memory session store");
            Ok(Arc::new(MemoryStore::new()))
        }
        _ => {
            tracing::info!("Using file session store at {}", config.store.path);
            Ok(Arc::new(JsonFileStore::open(&config.store.path)?))
        }
    }
}

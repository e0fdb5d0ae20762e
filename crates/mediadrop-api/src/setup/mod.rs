//! Application setup and initialization
//!
//! Wiring lives here rather than in main.rs so integration tests can build
//! the same router over a temporary upload directory.

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use crate::telemetry::{init_telemetry, LogFormat};
use anyhow::{Context, Result};
use mediadrop_core::Config;
use std::sync::Arc;

/// Initialize the entire application: telemetry, storage and routes
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    config
        .validate()
        .context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    build_app(config).await
}

/// Open storage and build the router without touching global telemetry.
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let store = storage::setup_storage(&config).await?;
    let state = Arc::new(AppState::new(config.clone(), store));
    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}

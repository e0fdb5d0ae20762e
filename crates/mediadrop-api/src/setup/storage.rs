//! Storage setup and initialization

use anyhow::{Context, Result};
use mediadrop_core::Config;
use mediadrop_services::{create_storage, MediaStore};
use std::sync::Arc;

/// Open the upload root, creating it if needed.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn MediaStore>> {
    tracing::info!(upload_dir = %config.upload_dir().display(), "Initializing storage...");
    let store = create_storage(config).await.with_context(|| {
        format!(
            "Failed to open upload directory {}",
            config.upload_dir().display()
        )
    })?;
    Ok(store)
}

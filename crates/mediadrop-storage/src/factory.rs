use crate::{LocalStorage, MediaStore, StorageResult};
use mediadrop_core::Config;
use std::sync::Arc;

/// Create the storage backend rooted at the configured upload directory
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn MediaStore>> {
    let storage = LocalStorage::new(config.upload_dir()).await?;

    tracing::info!(
        upload_dir = %storage.root().display(),
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}

//! Application state shared by all handlers.

use mediadrop_core::{Config, MediaValidator};
use mediadrop_services::{ArchiveExporter, MediaStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn MediaStore>,
    pub validator: MediaValidator,
    pub exporter: ArchiveExporter,
}

impl AppState {
    /// Wire the components over an already-opened store.
    ///
    /// The exporter walks the store's canonical root so archive entry names
    /// match the paths reported by uploads.
    pub fn new(config: Config, store: Arc<dyn MediaStore>) -> Self {
        let validator = MediaValidator::new(config.max_file_size_bytes());
        let exporter = ArchiveExporter::new(
            store.root().to_path_buf(),
            config.export_dir().map(|p| p.to_path_buf()),
        );
        Self {
            config,
            store,
            validator,
            exporter,
        }
    }
}

//! Mediadrop Services Layer
//!
//! Orchestration that sits between the HTTP handlers and storage: the
//! per-request upload state machine and the zip exporter. Handlers stay thin
//! and framework types never reach this crate.

pub mod archive;
pub mod upload;

pub use archive::{ArchiveExporter, ExportArchive};
pub use mediadrop_core::{MediaValidator, StorageStats};
pub use mediadrop_storage::{create_storage, LocalStorage, MediaStore, StorageError, StorageResult};
pub use upload::{FilePart, UploadSession};

//! Storage abstraction trait
//!
//! The upload orchestrator and the HTTP layer only see [`MediaStore`]; the
//! filesystem implementation lives in [`crate::local`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediadrop_core::{AppError, StorageStats};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    #[error("Upload failed for {}: {source}", path.display())]
    UploadFailed { path: PathBuf, source: io::Error },

    #[error("Delete failed for {}: {source}", path.display())]
    DeleteFailed { path: PathBuf, source: io::Error },

    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::CreateDirFailed { path, source } => AppError::io(
                format!("Failed to create directory {}", path.display()),
                source,
            ),
            StorageError::UploadFailed { path, source } => {
                AppError::io(format!("Failed to write {}", path.display()), source)
            }
            StorageError::DeleteFailed { path, source } => {
                AppError::io(format!("Failed to delete {}", path.display()), source)
            }
            StorageError::ReadFailed { path, source } => {
                AppError::io(format!("Failed to read {}", path.display()), source)
            }
            StorageError::InvalidPath(msg) => AppError::Internal(msg),
            StorageError::TaskFailed(msg) => AppError::Internal(msg),
        }
    }
}

/// A file fully written, flushed and closed by [`MediaStore::persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFile {
    /// Absolute path of the written file
    pub path: PathBuf,
    /// Exact number of bytes copied from the reader
    pub size: u64,
}

/// Storage abstraction trait
///
/// Directory creation, streaming writes, deletion and usage accounting for
/// upload batches. Implementations must be safe to share across requests.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Absolute storage root
    fn root(&self) -> &Path;

    /// Resolve `{root}/{sanitized name or "unnamed"}/{timestamp}` and create
    /// it (with parents). Returns the absolute directory path.
    async fn create_batch_dir(
        &self,
        batch_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> StorageResult<PathBuf>;

    /// Stream `reader` into `dir` until EOF and store it as `file_name`.
    ///
    /// `file_name` must already be sanitized. Existing files are never
    /// replaced: a taken name is numbered (`a.jpg`, `a-1.jpg`, ...) and the
    /// returned path is the one actually written. The data only appears under
    /// its final name once flushed and synced; a failed or cancelled write
    /// leaves nothing behind.
    async fn persist(
        &self,
        dir: &Path,
        file_name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<PersistedFile>;

    /// Delete a stored file. Paths outside the root are rejected.
    async fn remove(&self, path: &Path) -> StorageResult<()>;

    /// Count regular files and sum their sizes under the root.
    /// A missing root yields zero counts.
    async fn stats(&self) -> StorageResult<StorageStats>;
}

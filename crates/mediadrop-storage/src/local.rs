use crate::keys::{batch_timestamp, numbered_file_name, sanitize_batch_name};
use crate::traits::{MediaStore, PersistedFile, StorageError, StorageResult};
use crate::walk::walk_files;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediadrop_core::StorageStats;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader};

/// Copy buffer size for streaming writes; bounds peak memory per upload.
pub const PERSIST_BUFFER_SIZE: usize = 8 * 1024;

/// Prefix of in-flight uploads inside a batch directory.
const STAGING_PREFIX: &str = ".upload-";

/// Numbered names tried before giving up on a crowded directory.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// Creates `base_path` if needed and canonicalizes it, so every path the
    /// store hands out is absolute.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path)
            .await
            .map_err(|source| StorageError::CreateDirFailed {
                path: base_path.clone(),
                source,
            })?;

        let base_path = fs::canonicalize(&base_path)
            .await
            .map_err(|source| StorageError::ReadFailed {
                path: base_path.clone(),
                source,
            })?;

        Ok(LocalStorage { base_path })
    }

    /// Reject paths that would resolve outside the storage root.
    fn ensure_within_root(&self, path: &Path) -> StorageResult<()> {
        let escapes = path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes || !path.starts_with(&self.base_path) {
            return Err(StorageError::InvalidPath(format!(
                "{} is outside the storage root",
                path.display()
            )));
        }
        Ok(())
    }
}

/// Move a finished upload to the first free name derived from `file_name`.
///
/// The rename never replaces an existing file, so two uploads racing for the
/// same name both survive.
fn claim_file_name(mut staged: TempPath, dir: &Path, file_name: &str) -> StorageResult<PathBuf> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = dir.join(numbered_file_name(file_name, attempt));
        match staged.persist_noclobber(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => staged = e.path,
            Err(e) => {
                return Err(StorageError::UploadFailed {
                    path: candidate,
                    source: e.error,
                })
            }
        }
    }

    Err(StorageError::UploadFailed {
        path: dir.join(file_name),
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free file name left in batch directory",
        ),
    })
}

#[async_trait]
impl MediaStore for LocalStorage {
    fn root(&self) -> &Path {
        &self.base_path
    }

    async fn create_batch_dir(
        &self,
        batch_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> StorageResult<PathBuf> {
        let dir = self
            .base_path
            .join(sanitize_batch_name(batch_name))
            .join(batch_timestamp(at));

        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::CreateDirFailed {
                path: dir.clone(),
                source,
            })?;

        tracing::debug!(path = %dir.display(), "Batch directory ready");
        Ok(dir)
    }

    async fn persist(
        &self,
        dir: &Path,
        file_name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<PersistedFile> {
        let requested = dir.join(file_name);
        self.ensure_within_root(&requested)?;
        let start = std::time::Instant::now();

        // Dropping `staged` (error or cancelled future) deletes the file.
        let (file, staged) = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(dir)
            .map_err(|source| StorageError::UploadFailed {
                path: requested.clone(),
                source,
            })?
            .into_parts();
        let mut file = fs::File::from_std(file);

        let mut reader = BufReader::with_capacity(PERSIST_BUFFER_SIZE, reader);
        let copied = async {
            let bytes = tokio::io::copy_buf(&mut reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, io::Error>(bytes)
        }
        .await;
        drop(file);

        let size = copied.map_err(|source| StorageError::UploadFailed {
            path: requested.clone(),
            source,
        })?;
        let path = claim_file_name(staged, dir, file_name)?;

        tracing::info!(
            path = %path.display(),
            size_bytes = size,
            renamed = path != requested,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );
        Ok(PersistedFile { path, size })
    }

    async fn remove(&self, path: &Path) -> StorageResult<()> {
        self.ensure_within_root(path)?;

        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::DeleteFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn stats(&self) -> StorageResult<StorageStats> {
        let root = self.base_path.clone();
        let files = tokio::task::spawn_blocking(move || walk_files(&root))
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))?
            .map_err(|source| StorageError::ReadFailed {
                path: self.base_path.clone(),
                source,
            })?;

        let mut stats = StorageStats::default();
        for file in &files {
            stats.record(file.size);
        }
        Ok(stats)
    }
}

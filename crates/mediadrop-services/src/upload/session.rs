//! Per-request upload state machine
//!
//! The HTTP layer feeds multipart parts to an [`UploadSession`] in arrival
//! order and calls [`UploadSession::finish`] once the body is exhausted.
//!
//! States: `AwaitingDirectory` until the first file passes the type check,
//! then `Processing` with the resolved batch directory, or `Failed` after the
//! first rejection. A failed session still drains every later file part.

use chrono::Utc;
use mediadrop_core::{AppError, MediaValidator, StoredFile, UploadSummary};
use mediadrop_storage::{sanitize_file_name, MediaStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncRead;

/// One incoming file part
pub struct FilePart<R> {
    /// Client-supplied file name (untrusted)
    pub file_name: String,
    /// Declared MIME type, if the part carried one
    pub content_type: Option<String>,
    pub reader: R,
}

#[derive(Debug)]
enum SessionState {
    AwaitingDirectory,
    Processing { batch_dir: PathBuf },
    Failed { rejection: AppError },
}

pub struct UploadSession {
    store: Arc<dyn MediaStore>,
    validator: MediaValidator,
    batch_name: Option<String>,
    state: SessionState,
    files: Vec<StoredFile>,
}

impl UploadSession {
    pub fn new(store: Arc<dyn MediaStore>, validator: MediaValidator) -> Self {
        Self {
            store,
            validator,
            batch_name: None,
            state: SessionState::AwaitingDirectory,
            files: Vec::new(),
        }
    }

    /// Record the `uploadName` form field.
    ///
    /// Only names seen before the batch directory is created take effect.
    pub fn record_batch_name(&mut self, name: String) {
        match self.state {
            SessionState::AwaitingDirectory => {
                self.batch_name = Some(name);
            }
            _ => {
                tracing::debug!(
                    upload_name = %name,
                    "Ignoring uploadName received after the batch directory was resolved"
                );
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, SessionState::Failed { .. })
    }

    /// Validate and persist one file part.
    ///
    /// Validation rejections move the session to `Failed` and return `Ok`;
    /// the rejection surfaces from [`finish`](Self::finish). I/O failures
    /// abort the request and are returned immediately.
    pub async fn accept_file<R>(&mut self, mut part: FilePart<R>) -> Result<(), AppError>
    where
        R: AsyncRead + Send + Unpin,
    {
        if self.is_failed() {
            drain(&part.file_name, &mut part.reader).await;
            return Ok(());
        }

        let type_check = self
            .validator
            .check_media_type(&part.file_name, part.content_type.as_deref());
        if let Err(rejection) = type_check.into_result() {
            drain(&part.file_name, &mut part.reader).await;
            self.fail(rejection);
            return Ok(());
        }

        let batch_dir = self.ensure_batch_dir().await?;
        let persisted = self
            .store
            .persist(&batch_dir, &sanitize_file_name(&part.file_name), &mut part.reader)
            .await?;
        // Numbered by the store when the sanitized name was already taken.
        let sanitized_name = persisted
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let size_check = self.validator.check_file_size(&part.file_name, persisted.size);
        if let Err(rejection) = size_check.into_result() {
            self.store.remove(&persisted.path).await?;
            self.fail(rejection);
            return Ok(());
        }

        tracing::debug!(
            original_name = %part.file_name,
            path = %persisted.path.display(),
            size_bytes = persisted.size,
            "Stored uploaded file"
        );

        self.files.push(StoredFile {
            original_name: part.file_name,
            sanitized_name,
            saved_path: persisted.path,
            mime_type: part.content_type.unwrap_or_default(),
            size: persisted.size,
            uploaded_at: Utc::now(),
        });

        Ok(())
    }

    /// Close the session once every part has been consumed.
    pub fn finish(self) -> Result<UploadSummary, AppError> {
        match self.state {
            SessionState::Failed { rejection } => Err(rejection),
            SessionState::AwaitingDirectory => Err(AppError::NoFilesProvided),
            SessionState::Processing { batch_dir } => {
                if self.files.is_empty() {
                    return Err(AppError::NoFilesProvided);
                }
                Ok(UploadSummary {
                    batch_dir,
                    files: self.files,
                })
            }
        }
    }

    async fn ensure_batch_dir(&mut self) -> Result<PathBuf, AppError> {
        if let SessionState::Processing { batch_dir } = &self.state {
            return Ok(batch_dir.clone());
        }

        let batch_dir = self
            .store
            .create_batch_dir(self.batch_name.as_deref(), Utc::now())
            .await?;
        self.state = SessionState::Processing {
            batch_dir: batch_dir.clone(),
        };
        Ok(batch_dir)
    }

    fn fail(&mut self, rejection: AppError) {
        tracing::debug!(
            error = %rejection,
            stored_before_rejection = self.files.len(),
            "Upload rejected"
        );
        self.state = SessionState::Failed { rejection };
    }
}

/// Consume and discard the rest of a part so the connection can move on.
async fn drain<R>(file_name: &str, reader: &mut R)
where
    R: AsyncRead + Unpin,
{
    if let Err(e) = tokio::io::copy(reader, &mut tokio::io::sink()).await {
        tracing::warn!(
            error = %e,
            file_name = %file_name,
            "Failed to drain discarded upload part"
        );
    }
}

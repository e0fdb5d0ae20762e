use crate::constants::UPLOAD_NAME_FIELD;
use crate::error::HttpAppError;
use crate::middleware::RequestId;
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mediadrop_core::{AppError, StoredFile, UploadSummary};
use mediadrop_services::{FilePart, UploadSession};
use serde::Serialize;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileResponse {
    pub original_name: String,
    pub saved_path: String,
    pub mime_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<StoredFile> for UploadedFileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            original_name: file.original_name,
            saved_path: file.saved_path.to_string_lossy().into_owned(),
            mime_type: file.mime_type,
            size: file.size,
            uploaded_at: file.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub uploaded_files: Vec<UploadedFileResponse>,
    pub total_files: usize,
    pub total_size: u64,
    pub upload_path: String,
}

impl From<UploadSummary> for UploadResponse {
    fn from(summary: UploadSummary) -> Self {
        let total_files = summary.total_files();
        let total_size = summary.total_size();
        Self {
            success: true,
            message: format!("Successfully uploaded {} file(s)", total_files),
            upload_path: summary.batch_dir.to_string_lossy().into_owned(),
            uploaded_files: summary.files.into_iter().map(Into::into).collect(),
            total_files,
            total_size,
        }
    }
}

/// `POST /upload`
///
/// Parts are consumed in arrival order. Any part with a filename is a file
/// regardless of its field name; `uploadName` sets the batch name; anything
/// else is drained and ignored.
#[tracing::instrument(skip_all, fields(request_id = %request_id.0))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut session = UploadSession::new(state.store.clone(), state.validator);

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", &e))?
    {
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        if let Some(file_name) = file_name {
            let content_type = field.content_type().map(str::to_string);
            let reader = StreamReader::new(field.map_err(io::Error::other));
            tokio::pin!(reader);
            session
                .accept_file(FilePart {
                    file_name,
                    content_type,
                    reader,
                })
                .await
                .map_err(recover_multipart_cause)?;
        } else if field.name() == Some(UPLOAD_NAME_FIELD) {
            let name = field.text().await.map_err(|e| {
                multipart_error(&format!("Failed to read {}", UPLOAD_NAME_FIELD), &e)
            })?;
            session.record_batch_name(name);
        } else {
            discard_field(&mut field).await?;
        }
    }

    let summary = session.finish()?;

    tracing::info!(
        batch_dir = %summary.batch_dir.display(),
        total_files = summary.total_files(),
        total_size = summary.total_size(),
        "Upload completed"
    );

    Ok((StatusCode::CREATED, Json(UploadResponse::from(summary))))
}

async fn discard_field(field: &mut Field<'_>) -> Result<(), AppError> {
    let name = field.name().unwrap_or_default().to_string();
    let mut discarded = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", &e))?
    {
        discarded += chunk.len();
    }
    tracing::debug!(field = %name, bytes = discarded, "Ignored unknown multipart field");
    Ok(())
}

/// A body cut off by the request size limit is `413`, anything else the
/// client sent wrong is `400`.
fn multipart_error(context: &str, err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("{}: {}", context, err.body_text()))
    }
}

/// File bodies reach storage as an `io::Error` wrapping the multipart
/// failure; unwrap it so a broken request body is not reported as a
/// storage fault.
fn recover_multipart_cause(err: AppError) -> AppError {
    if let AppError::Io { source, .. } = &err {
        if let Some(cause) = source
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
        {
            return multipart_error("Failed to read file part", cause);
        }
    }
    err
}

use crate::constants::EXPORT_FILENAME_PREFIX;
use crate::error::HttpAppError;
use crate::middleware::RequestId;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use futures::StreamExt;
use mediadrop_core::AppError;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// `GET /export`
///
/// Builds a fresh archive of the whole upload root and streams it from disk.
/// The archive file is removed once the response body is dropped.
#[tracing::instrument(skip_all, fields(request_id = %request_id.0))]
pub async fn export_uploads(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state.store.stats().await?;
    if stats.is_empty() {
        return Err(AppError::NothingToExport.into());
    }

    let archive = state.exporter.export().await?;
    let file = tokio::fs::File::open(archive.path())
        .await
        .map_err(|e| AppError::io("Failed to open export archive", e))?;

    let size = archive.size;
    let filename = format!(
        "{}{}.zip",
        EXPORT_FILENAME_PREFIX,
        chrono::Utc::now().timestamp_millis()
    );

    tracing::info!(
        entries = archive.entries,
        archive_bytes = size,
        filename = %filename,
        "Serving export archive"
    );

    // The stream owns the archive handle so the temp file outlives the body.
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep = &archive;
        chunk
    });

    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", filename))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition header: {}", e)))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build export response: {}", e)))?;

    Ok(response)
}

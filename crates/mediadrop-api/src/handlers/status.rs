use crate::error::HttpAppError;
use crate::middleware::RequestId;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub total_files: u64,
    pub total_size_bytes: u64,
}

/// `GET /status`: file count and byte total under the upload root.
#[tracing::instrument(skip_all, fields(request_id = %request_id.0))]
pub async fn storage_status(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state.store.stats().await?;

    Ok(Json(StatusResponse {
        success: true,
        total_files: stats.total_files,
        total_size_bytes: stats.total_bytes,
    }))
}

//! Health check handler and response type.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a check with a timeout; `true` only when it finished successfully.
async fn run_check<F>(timeout: Duration, f: F) -> bool
where
    F: Future<Output = io::Result<()>>,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Health check failed");
            false
        }
        Err(_) => {
            tracing::warn!("Health check timed out");
            false
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct HealthCheckResponse {
    pub status: &'static str,
    pub storage: &'static str,
}

/// Liveness check. Always `200` while the process serves requests; `storage`
/// reports whether the upload root is currently reachable.
pub(crate) async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let root = state.store.root().to_path_buf();
    let storage_ok = run_check(CHECK_TIMEOUT, async move {
        let metadata = tokio::fs::metadata(&root).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                "upload root is not a directory",
            ))
        }
    })
    .await;

    (
        StatusCode::OK,
        Json(HealthCheckResponse {
            status: "healthy",
            storage: if storage_ok { "healthy" } else { "unavailable" },
        }),
    )
}

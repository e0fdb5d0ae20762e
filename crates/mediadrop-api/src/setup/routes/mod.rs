//! Route configuration and setup.
//!
//! The four endpoints plus the framework layers around them: CORS, gzip,
//! body limit, request timeout, concurrency cap, tracing, request ids and
//! per-client rate limiting.

mod health;

use crate::constants::{EXPORT_PATH, HEALTH_PATH, STATUS_PATH, UPLOAD_PATH};
use crate::handlers::{export::export_uploads, status::storage_status, upload::upload_files};
use crate::middleware::{rate_limit_middleware, request_id_middleware, HttpRateLimiter};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use mediadrop_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let rate_limiter = setup_rate_limiter(config);

    let http_concurrency_limit = config.http_concurrency_limit();
    let request_timeout_secs = config.request_timeout_secs();
    let body_limit = usize::try_from(config.max_request_size_bytes()).unwrap_or(usize::MAX);
    tracing::info!(
        http_concurrency_limit,
        request_timeout_secs,
        body_limit_bytes = body_limit,
        "HTTP layers configured"
    );

    // Archives are already deflated.
    let compression = CompressionLayer::new().compress_when(
        DefaultPredicate::new().and(NotForContentType::const_new("application/zip")),
    );

    let app = Router::new()
        .route(UPLOAD_PATH, post(upload_files))
        .route(EXPORT_PATH, get(export_uploads))
        .route(STATUS_PATH, get(storage_status))
        .route(HEALTH_PATH, get(health::health_check))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(compression)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn setup_rate_limiter(config: &Config) -> Arc<HttpRateLimiter> {
    let rate_limiter = Arc::new(HttpRateLimiter::new(config.http_rate_limit_per_minute()));

    // Stops once the router (and with it the limiter) is dropped.
    let weak = Arc::downgrade(&rate_limiter);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(limiter) = weak.upgrade() else {
                break;
            };
            limiter.cleanup_expired_buckets().await;
        }
    });

    tracing::info!(
        rate_limit_per_minute = config.http_rate_limit_per_minute(),
        "HTTP rate limiting enabled"
    );
    rate_limiter
}

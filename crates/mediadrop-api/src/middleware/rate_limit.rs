use super::client_ip::client_ip;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const DEFAULT_SHARD_COUNT: usize = 16;
const MAX_BUCKETS_PER_SHARD: usize = 10_000;

static RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Fixed-window counter for one client
#[derive(Clone, Debug)]
struct RateLimitBucket {
    count: u32,
    reset_at: Instant,
}

impl RateLimitBucket {
    fn new(window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: Instant::now() + window,
        }
    }

    fn check_and_increment(&mut self, limit: u32, window: Duration) -> Result<u32, Duration> {
        let now = Instant::now();
        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = now + window;
        }

        if self.count < limit {
            self.count += 1;
            Ok(limit - self.count)
        } else {
            Err(self.reset_at.saturating_duration_since(now))
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }
}

/// Per-client request limiter
///
/// Buckets are spread over several mutex-guarded maps so concurrent clients
/// rarely contend on the same lock.
#[derive(Debug)]
pub struct HttpRateLimiter {
    shards: Vec<Mutex<HashMap<String, RateLimitBucket>>>,
    limit_per_window: u32,
    window: Duration,
}

impl HttpRateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self::with_window(limit_per_minute, Duration::from_secs(60), DEFAULT_SHARD_COUNT)
    }

    pub fn with_window(limit_per_window: u32, window: Duration, shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            shards,
            limit_per_window,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit_per_window
    }

    fn shard(&self, key: &str) -> &Mutex<HashMap<String, RateLimitBucket>> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Count one request for `key`.
    ///
    /// Returns the remaining budget, or how long until the window resets.
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        let mut buckets = self.shard(key).lock().await;

        if buckets.len() >= MAX_BUCKETS_PER_SHARD && !buckets.contains_key(key) {
            let now = Instant::now();
            buckets.retain(|_, bucket| !bucket.is_expired(now));
        }

        buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket::new(self.window))
            .check_and_increment(self.limit_per_window, self.window)
    }

    /// Drop buckets whose window has passed.
    pub async fn cleanup_expired_buckets(&self) {
        let now = Instant::now();
        let mut cleaned = 0;
        for shard in &self.shards {
            let mut buckets = shard.lock().await;
            let before = buckets.len();
            buckets.retain(|_, bucket| !bucket.is_expired(now));
            cleaned += before - buckets.len();
        }
        if cleaned > 0 {
            tracing::debug!(buckets_cleaned = cleaned, "Cleaned up expired rate limit buckets");
        }
    }
}

/// HTTP rate limiting middleware
///
/// Keys requests by client address and answers `429 Too Many Requests` with
/// `Retry-After` once a client exhausts its window. Successful responses
/// carry `X-RateLimit-Limit` and `X-RateLimit-Remaining`.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<HttpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = match client_ip(request.headers(), peer) {
        Some(ip) => format!("ip:{}", ip),
        None => "ip:unknown".to_string(),
    };
    let limit = rate_limiter.limit();

    match rate_limiter.check(&key).await {
        Ok(remaining) => {
            let mut response = next.run(request).await;
            insert_header(&mut response, &RATE_LIMIT_LIMIT, limit.into());
            insert_header(&mut response, &RATE_LIMIT_REMAINING, remaining.into());
            response
        }
        Err(reset_in) => {
            let retry_after = reset_in.as_secs().max(1);
            tracing::warn!(
                client = %key,
                path = %request.uri().path(),
                limit = limit,
                retry_after_secs = retry_after,
                "Rate limit exceeded"
            );

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Too many requests",
                    "code": "RATE_LIMITED"
                })),
            )
                .into_response();
            insert_header(&mut response, &RATE_LIMIT_LIMIT, limit.into());
            insert_header(&mut response, &RATE_LIMIT_REMAINING, HeaderValue::from(0u32));
            insert_header(&mut response, &RETRY_AFTER, retry_after.into());
            response
        }
    }
}

fn insert_header(response: &mut Response, name: &HeaderName, value: HeaderValue) {
    response.headers_mut().insert(name.clone(), value);
}

//! Per-client token-bucket rate limiting
//!
//! Each client identifier gets an independent bucket: capacity 10, refilled
//! in full at fixed 60-second intervals (not continuously). Check-and-consume
//! happens under one lock, so concurrent requests from the same client cannot
//! double-admit. Idle buckets are evicted once the map grows past a
//! threshold, keeping memory bounded under a churn of distinct clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const DEFAULT_CAPACITY: u32 = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Eviction only runs when the map holds at least this many buckets
const PRUNE_THRESHOLD: usize = 1024;

/// Buckets idle for this many refill windows are eligible for eviction
const IDLE_WINDOWS: u32 = 10;

struct Bucket {
    tokens: u32,
    window_start: Instant,
    last_seen: Instant,
}

/// Keyed token-bucket limiter shared across handlers
pub struct ClientRateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    capacity: u32,
    window: Duration,
}

impl ClientRateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity,
            window,
        }
    }

    /// Consume one token for `client_id`, creating its bucket on first use.
    ///
    /// Returns false when the bucket is empty for the current window.
    pub fn try_admit(&self, client_id: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().unwrap();

        if buckets.len() >= PRUNE_THRESHOLD {
            let idle_cutoff = self.window * IDLE_WINDOWS;
            buckets.retain(|_, b| now.duration_since(b.last_seen) < idle_cutoff);
        }

        let bucket = buckets.entry(client_id.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            window_start: now,
            last_seen: now,
        });

        // Fixed-interval refill: the full capacity returns when the window
        // elapses, nothing trickles back in between.
        if now.duration_since(bucket.window_start) >= self.window {
            bucket.tokens = self.capacity;
            bucket.window_start = now;
        }
        bucket.last_seen = now;

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }
}

impl Default for ClientRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_WINDOW)
    }
}

/// Admission middleware applied ahead of the pipeline routes.
///
/// Identifies the client by the first `X-Forwarded-For` entry when present,
/// else the peer address.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client_id = client_id(&request);

    if state.limiter.try_admit(&client_id) {
        next.run(request).await
    } else {
        warn!(client = %client_id, "Rate limit exceeded");
        ApiError::RateLimited.into_response()
    }
}

fn client_id(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

//! API rate limiting middleware.
//!
//! Provides per-IP fixed-window rate limiting; the auth endpoints get
//! tighter limits than the rest of the surface.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use regfeed_common::AppError;
use tokio::sync::RwLock;

/// Rate limit configuration for one endpoint category.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Time window duration in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Create a new rate limit config.
    #[must_use]
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

/// Default rate limits for the endpoint categories.
pub mod limits {
    use super::RateLimitConfig;

    /// Standard API endpoints.
    pub const STANDARD: RateLimitConfig = RateLimitConfig::new(300, 60);

    /// Login endpoint: 5 requests per minute.
    pub const LOGIN: RateLimitConfig = RateLimitConfig::new(5, 60);

    /// Refresh endpoint: 10 requests per minute.
    pub const REFRESH: RateLimitConfig = RateLimitConfig::new(10, 60);
}

/// Rate limit state for a single key.
#[derive(Debug, Clone)]
struct WindowState {
    /// Request count in current window.
    count: u32,
    /// Window start time.
    window_start: Instant,
}

impl WindowState {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request allowed.
    Allowed,
    /// Request rejected; retry after the given number of seconds.
    Limited { retry_after: u64 },
}

/// In-memory fixed-window rate limiter.
#[derive(Clone, Default)]
pub struct ApiRateLimiter {
    /// State per key (client IP, qualified by route category).
    states: Arc<RwLock<HashMap<String, WindowState>>>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a request is allowed and record it.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(config.window_secs);

        let state = states.entry(key.to_string()).or_insert_with(WindowState::new);

        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        if state.count >= config.max_requests {
            let retry_after = window
                .saturating_sub(now.duration_since(state.window_start))
                .as_secs();
            return RateLimitResult::Limited { retry_after };
        }

        state.count += 1;
        RateLimitResult::Allowed
    }
}

/// Shared limiter state for the middleware.
#[derive(Clone, Default)]
pub struct RateLimiterState {
    limiter: ApiRateLimiter,
}

impl RateLimiterState {
    /// Create a new limiter state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn config_for_path(path: &str) -> &'static RateLimitConfig {
    match path {
        "/auth/login" => &limits::LOGIN,
        "/auth/refresh" => &limits::REFRESH,
        _ => &limits::STANDARD,
    }
}

fn client_key(req: &Request<Body>) -> String {
    // Behind a proxy the first X-Forwarded-For hop is the client.
    if let Some(forwarded) = req.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
        && !ip.trim().is_empty()
    {
        return ip.trim().to_string();
    }

    if let Some(real_ip) = req.headers().get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return value.trim().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(state): State<RateLimiterState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    let config = config_for_path(path);
    let key = format!("{}:{path}", client_key(&req));

    match state.limiter.check(&key, config).await {
        RateLimitResult::Allowed => next.run(req).await,
        RateLimitResult::Limited { retry_after } => {
            let mut response = AppError::RateLimited.into_response();
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
            response
        }
    }
}

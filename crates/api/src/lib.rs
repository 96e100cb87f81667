//! HTTP API layer for regfeed.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, admins, ratings, feedbacks, regions, users, logs
//! - **Extractors**: authenticated-caller extraction from request extensions
//! - **Middleware**: bearer-token auth, uniform error envelope, rate limiting
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

pub use endpoints::router;
pub use rate_limit::{ApiRateLimiter, RateLimitConfig, RateLimiterState};

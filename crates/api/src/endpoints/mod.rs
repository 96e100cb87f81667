//! API endpoints.

mod admins;
mod auth;
mod feedbacks;
mod logs;
mod ratings;
mod regions;
mod users;

pub use feedbacks::FeedbackResponse;
pub use regions::RegionSummary;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admins", admins::router())
        .merge(ratings::router())
        .merge(feedbacks::router())
        .nest("/regions", regions::router())
        .nest("/logs", logs::router())
        .nest("/users", users::router())
}

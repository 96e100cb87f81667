//! User directory endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use regfeed_common::{AppError, AppResult};
use regfeed_core::UserWithFeedbackCount;
use serde::Serialize;

use crate::{
    endpoints::feedbacks::FeedbackResponse,
    extractors::AuthAdmin,
    middleware::AppState,
    response::ApiResponse,
};

/// Create user-directory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user))
        .route("/{id}/feedbacks", get(get_user_feedbacks))
}

/// User response with its feedback count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub feedback_count: u64,
}

impl From<UserWithFeedbackCount> for UserResponse {
    fn from(entry: UserWithFeedbackCount) -> Self {
        Self {
            id: entry.user.id,
            email: entry.user.email,
            full_name: entry.user.full_name,
            phone: entry.user.phone,
            created_at: entry.user.created_at,
            feedback_count: entry.feedback_count,
        }
    }
}

/// User detail response with its feedbacks.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub feedbacks: Vec<FeedbackResponse>,
}

/// List users with their feedback counts (admin or above).
async fn list_users(
    AuthAdmin(_caller): AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list_with_counts().await?;

    Ok(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

/// Fetch one user with its feedbacks (admin or above).
async fn get_user(
    AuthAdmin(_caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserDetailResponse>> {
    let user = state
        .user_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let feedbacks = state.feedback_service.records_for_user(&user.id).await?;

    Ok(ApiResponse::ok(UserDetailResponse {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        phone: user.phone,
        created_at: user.created_at,
        feedbacks: feedbacks.into_iter().map(FeedbackResponse::from).collect(),
    }))
}

/// List one user's feedbacks (admin or above).
async fn get_user_feedbacks(
    AuthAdmin(_caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<FeedbackResponse>>> {
    let feedbacks = state.feedback_service.records_for_user(&id).await?;

    Ok(ApiResponse::ok(
        feedbacks.into_iter().map(FeedbackResponse::from).collect(),
    ))
}

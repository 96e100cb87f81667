//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use regfeed_common::AppResult;
use regfeed_db::entities::admin::AdminRole;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// The authenticated admin inside a login/refresh response.
#[derive(Debug, Serialize)]
pub struct AuthUserResponse {
    pub id: String,
    pub fullname: String,
    pub email: String,
}

/// Login/refresh response.
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub role: AdminRole,
    pub user: AuthUserResponse,
}

/// Authenticate with email and password.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    req.validate()?;

    let (tokens, admin) = state.auth_service.login(&req.email, &req.password).await?;

    Ok(ApiResponse::ok(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        role: admin.role,
        user: AuthUserResponse {
            id: admin.id,
            fullname: admin.fullname,
            email: admin.email,
        },
    }))
}

/// Refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Reissue a credential pair from a refresh credential.
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    let (tokens, admin) = state.auth_service.refresh(&req.refresh_token).await?;

    Ok(ApiResponse::ok(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        role: admin.role,
        user: AuthUserResponse {
            id: admin.id,
            fullname: admin.fullname,
            email: admin.email,
        },
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

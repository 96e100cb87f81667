//! Admin directory endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, Utc};
use regfeed_common::{AppError, AppResult, Page};
use regfeed_core::{AdminListQuery, AdminRecord, CreateAdminInput, UpdateAdminInput};
use regfeed_db::entities::admin::AdminRole;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

use crate::{
    endpoints::regions::RegionSummary,
    extractors::AuthAdmin,
    middleware::AppState,
    response::ApiResponse,
};

/// Create admin-directory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_admin))
        .route("/", get(list_admins))
        .route("/{id}", get(get_admin))
        .route("/{id}", patch(update_admin))
        .route("/{id}", delete(delete_admin))
}

/// Password policy: at least one lowercase, uppercase, digit and special
/// character. Length is enforced separately.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| "@$!%*?&".contains(c));

    if has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_strength");
        error.message = Some(
            "Password must contain at least one uppercase letter, one lowercase letter, \
             one number, and one special character (@$!%*?&)"
                .into(),
        );
        Err(error)
    }
}

/// Create admin request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 256))]
    pub fullname: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 12, max = 128), custom(function = "validate_password_strength"))]
    pub password: String,

    #[serde(default)]
    pub role: AdminRole,

    #[serde(default)]
    pub allowed_regions: Vec<String>,
}

/// Admin response for listings; assigned regions as plain ids.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub role: AdminRole,
    pub allowed_regions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AdminRecord> for AdminResponse {
    fn from(record: AdminRecord) -> Self {
        Self {
            id: record.admin.id,
            fullname: record.admin.fullname,
            email: record.admin.email,
            role: record.admin.role,
            allowed_regions: record
                .allowed_regions
                .iter()
                .map(|r| r.id().to_string())
                .collect(),
            created_at: record.admin.created_at,
            updated_at: record.admin.updated_at,
        }
    }
}

/// Admin detail response; assigned regions resolved to id/name pairs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDetailResponse {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub role: AdminRole,
    pub allowed_regions: Vec<RegionSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AdminRecord> for AdminDetailResponse {
    fn from(record: AdminRecord) -> Self {
        Self {
            id: record.admin.id,
            fullname: record.admin.fullname,
            email: record.admin.email,
            role: record.admin.role,
            allowed_regions: record.allowed_regions.iter().map(RegionSummary::from).collect(),
            created_at: record.admin.created_at,
            updated_at: record.admin.updated_at,
        }
    }
}

/// Create an admin (super-admin only).
async fn create_admin(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<CreateAdminRequest>,
) -> AppResult<ApiResponse<AdminDetailResponse>> {
    if !caller.role.is_super() {
        return Err(AppError::Forbidden(
            "Only super admins can create admins".to_string(),
        ));
    }
    req.validate()?;

    info!(admin_id = %caller.id, email = %req.email, "Creating admin");

    let record = state
        .admin_service
        .create(CreateAdminInput {
            fullname: req.fullname,
            email: req.email,
            password: req.password,
            role: req.role,
            allowed_regions: req.allowed_regions,
        })
        .await?;

    Ok(ApiResponse::ok(AdminDetailResponse::from(record)))
}

/// Admin list query.
#[derive(Debug, Deserialize, Validate)]
pub struct ListAdminsQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub limit: u64,
    pub search: Option<String>,
    pub role: Option<AdminRole>,
    pub region: Option<String>,
    pub sort: Option<String>,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    10
}

/// List admins visible to the caller.
async fn list_admins(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListAdminsQuery>,
) -> AppResult<ApiResponse<Page<AdminResponse>>> {
    query.validate()?;

    let page = state
        .admin_service
        .list(
            &AdminListQuery {
                page: query.page,
                limit: query.limit,
                search: query.search,
                role: query.role,
                region: query.region,
                sort: query.sort,
            },
            &caller,
        )
        .await?;

    Ok(ApiResponse::ok(Page {
        meta: page.meta,
        data: page.data.into_iter().map(AdminResponse::from).collect(),
    }))
}

/// Fetch one admin (scope-checked via assigned-region overlap).
async fn get_admin(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminDetailResponse>> {
    let record = state.admin_service.get(&id, &caller).await?;

    Ok(ApiResponse::ok(AdminDetailResponse::from(record)))
}

/// Update admin request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminRequest {
    #[validate(length(min = 1, max = 256))]
    pub fullname: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 12, max = 128), custom(function = "validate_password_strength"))]
    pub password: Option<String>,

    pub role: Option<AdminRole>,

    pub allowed_regions: Option<Vec<String>>,
}

/// Update an admin (scope-checked).
async fn update_admin(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAdminRequest>,
) -> AppResult<ApiResponse<AdminDetailResponse>> {
    req.validate()?;

    info!(admin_id = %caller.id, target_id = %id, "Updating admin");

    let record = state
        .admin_service
        .update(
            &id,
            UpdateAdminInput {
                fullname: req.fullname,
                email: req.email,
                password: req.password,
                role: req.role,
                allowed_regions: req.allowed_regions,
            },
            &caller,
        )
        .await?;

    Ok(ApiResponse::ok(AdminDetailResponse::from(record)))
}

/// Deleted-admin response.
#[derive(Debug, Serialize)]
pub struct DeletedAdminResponse {
    pub id: String,
}

/// Delete an admin (scope-checked; super admins cannot be deleted).
async fn delete_admin(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedAdminResponse>> {
    info!(admin_id = %caller.id, target_id = %id, "Deleting admin");

    state.admin_service.remove(&id, &caller).await?;

    Ok(ApiResponse::ok(DeletedAdminResponse { id }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength_policy() {
        assert!(validate_password_strength("Sup3r$ecretPass").is_ok());
        assert!(validate_password_strength("alllowercase1$").is_err());
        assert!(validate_password_strength("NoDigitsHere$").is_err());
        assert!(validate_password_strength("NoSpecial123a").is_err());
    }

    #[test]
    fn test_create_request_rejects_short_password() {
        let req = CreateAdminRequest {
            fullname: "New Admin".to_string(),
            email: "new@example.com".to_string(),
            password: "Sh0rt$".to_string(),
            role: AdminRole::Admin,
            allowed_regions: vec![],
        };

        assert!(req.validate().is_err());
    }
}

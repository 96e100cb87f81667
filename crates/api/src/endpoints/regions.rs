//! Region endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, Utc};
use regfeed_common::{AppError, AppResult, Page};
use regfeed_core::{RegionDetail, RegionRef, StarBreakdown};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    extractors::{AuthAdmin, MaybeAuthAdmin},
    middleware::AppState,
    response::ApiResponse,
};

/// Create region router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_region))
        .route("/", get(list_regions))
        .route("/{id}", get(get_region))
        .route("/{id}", patch(update_region))
        .route("/{id}", delete(delete_region))
}

/// A resolved region reference inside another resource's response.
#[derive(Debug, Serialize)]
pub struct RegionSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&RegionRef> for RegionSummary {
    fn from(region: &RegionRef) -> Self {
        Self {
            id: region.id().to_string(),
            name: region.name().map(ToString::to_string),
        }
    }
}

/// Region response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<regfeed_db::entities::region::Model> for RegionResponse {
    fn from(region: regfeed_db::entities::region::Model) -> Self {
        Self {
            id: region.id,
            name: region.name,
            created_at: region.created_at,
            updated_at: region.updated_at,
        }
    }
}

/// Region detail response with rating breakdown and admin count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDetailResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub admin_count: u64,
    pub rating: StarBreakdown,
}

impl From<RegionDetail> for RegionDetailResponse {
    fn from(detail: RegionDetail) -> Self {
        Self {
            id: detail.region.id,
            name: detail.region.name,
            created_at: detail.region.created_at,
            updated_at: detail.region.updated_at,
            admin_count: detail.admin_count,
            rating: detail.rating,
        }
    }
}

/// Create region request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRegionRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
}

/// Create a region (super-admin only).
async fn create_region(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Json(req): Json<CreateRegionRequest>,
) -> AppResult<ApiResponse<RegionResponse>> {
    if !caller.role.is_super() {
        return Err(AppError::Forbidden(
            "Only super admins can manage regions".to_string(),
        ));
    }
    req.validate()?;

    info!(admin_id = %caller.id, name = %req.name, "Creating region");

    let region = state.region_service.create(&req.name).await?;

    Ok(ApiResponse::ok(RegionResponse::from(region)))
}

/// Pagination query.
#[derive(Debug, Deserialize, Validate)]
pub struct ListRegionsQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub limit: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    10
}

/// List regions (public; scoped when the caller is a non-super admin).
async fn list_regions(
    MaybeAuthAdmin(caller): MaybeAuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListRegionsQuery>,
) -> AppResult<ApiResponse<Page<RegionResponse>>> {
    query.validate()?;

    let page = state
        .region_service
        .list(query.page, query.limit, caller.as_ref())
        .await?;

    Ok(ApiResponse::ok(Page {
        meta: page.meta,
        data: page.data.into_iter().map(RegionResponse::from).collect(),
    }))
}

/// Fetch one region with statistics (public; scoped when the caller is a
/// non-super admin).
async fn get_region(
    MaybeAuthAdmin(caller): MaybeAuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RegionDetailResponse>> {
    let detail = state.region_service.get(&id, caller.as_ref()).await?;

    Ok(ApiResponse::ok(RegionDetailResponse::from(detail)))
}

/// Update region request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRegionRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
}

/// Rename a region (super-admin only).
async fn update_region(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRegionRequest>,
) -> AppResult<ApiResponse<RegionResponse>> {
    if !caller.role.is_super() {
        return Err(AppError::Forbidden(
            "Only super admins can manage regions".to_string(),
        ));
    }
    req.validate()?;

    info!(admin_id = %caller.id, region_id = %id, "Updating region");

    let region = state.region_service.update(&id, &req.name).await?;

    Ok(ApiResponse::ok(RegionResponse::from(region)))
}

/// Deleted-entity response.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: String,
}

/// Delete a region (super-admin only). Does not cascade.
async fn delete_region(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedResponse>> {
    if !caller.role.is_super() {
        return Err(AppError::Forbidden(
            "Only super admins can manage regions".to_string(),
        ));
    }

    info!(admin_id = %caller.id, region_id = %id, "Deleting region");

    state.region_service.remove(&id).await?;

    Ok(ApiResponse::ok(DeletedResponse { id }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_region_summary_skips_missing_name() {
        let resolved = RegionSummary::from(&RegionRef::Resolved {
            id: "reg1".to_string(),
            name: "Tashkent".to_string(),
        });
        let dangling = RegionSummary::from(&RegionRef::Unresolved("gone".to_string()));

        let resolved_json = serde_json::to_string(&resolved).unwrap();
        let dangling_json = serde_json::to_string(&dangling).unwrap();

        assert!(resolved_json.contains("\"name\":\"Tashkent\""));
        assert!(!dangling_json.contains("name"));
    }
}

//! Rating endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use regfeed_common::{AppResult, Page};
use regfeed_core::{
    CreateRatingInput, RatingListQuery, RatingRecord, RatingStats, RatingStatsQuery, StatsPeriod,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    endpoints::regions::RegionSummary,
    extractors::AuthAdmin,
    middleware::AppState,
    response::ApiResponse,
};

/// Create rating router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ratings", post(submit_rating))
        .route("/admin/ratings", get(list_ratings))
        .route("/admin/ratings/stats", get(rating_stats))
        .route("/admin/ratings/{id}", get(get_rating))
}

/// Rating submission request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    #[validate(length(min = 1, max = 64))]
    pub region_id: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    #[validate(length(max = 4096))]
    pub comment: Option<String>,
}

/// Rating submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRatingResponse {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    pub message: &'static str,
}

/// Submit a rating (public).
async fn submit_rating(
    State(state): State<AppState>,
    Json(req): Json<CreateRatingRequest>,
) -> AppResult<ApiResponse<SubmittedRatingResponse>> {
    req.validate()?;

    let rating = state
        .rating_service
        .create(CreateRatingInput {
            region_id: req.region_id,
            rating: req.rating,
            comment: req.comment,
        })
        .await?;

    Ok(ApiResponse::ok(SubmittedRatingResponse {
        id: rating.id,
        submitted_at: rating.submitted_at,
        message: "Thank you! Your feedback matters to us.",
    }))
}

/// Rating response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: String,
    pub region_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionSummary>,
    pub rating: i32,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<RatingRecord> for RatingResponse {
    fn from(record: RatingRecord) -> Self {
        let region = match &record.region {
            region @ regfeed_core::RegionRef::Resolved { .. } => Some(RegionSummary::from(region)),
            regfeed_core::RegionRef::Unresolved(_) => None,
        };

        Self {
            id: record.rating.id,
            region_id: record.region.id().to_string(),
            region,
            rating: record.rating.rating,
            comment: record.rating.comment,
            submitted_at: record.rating.submitted_at,
        }
    }
}

/// Rating list query.
#[derive(Debug, Deserialize, Validate)]
pub struct ListRatingsQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub limit: u64,
    pub region: Option<String>,
    pub sort: Option<String>,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    10
}

/// List ratings visible to the caller (admin or above).
async fn list_ratings(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListRatingsQuery>,
) -> AppResult<ApiResponse<Page<RatingResponse>>> {
    query.validate()?;

    let page = state
        .rating_service
        .list(
            &RatingListQuery {
                page: query.page,
                limit: query.limit,
                region: query.region,
                sort: query.sort,
            },
            &caller,
        )
        .await?;

    Ok(ApiResponse::ok(Page {
        meta: page.meta,
        data: page.data.into_iter().map(RatingResponse::from).collect(),
    }))
}

/// Rating statistics query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStatsQueryParams {
    #[serde(default)]
    pub period: StatsPeriod,
    pub region: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Distribution and trend statistics over the caller's scope.
async fn rating_stats(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<RatingStatsQueryParams>,
) -> AppResult<ApiResponse<RatingStats>> {
    let stats = state
        .rating_service
        .stats(
            &RatingStatsQuery {
                period: query.period,
                region: query.region,
                start_date: query.start_date,
                end_date: query.end_date,
            },
            &caller,
        )
        .await?;

    Ok(ApiResponse::ok(stats))
}

/// Fetch one rating (admin or above, scope-checked).
async fn get_rating(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RatingResponse>> {
    let record = state.rating_service.get(&id, &caller).await?;

    Ok(ApiResponse::ok(RatingResponse::from(record)))
}

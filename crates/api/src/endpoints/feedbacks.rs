//! Feedback endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use regfeed_common::{AppError, AppResult, Page};
use regfeed_core::{
    CreateFeedbackInput, FeedbackListQuery, FeedbackRecord, SubmitterInfo, UpdateFeedbackInput,
};
use regfeed_db::entities::feedback::FeedbackStatus;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    endpoints::regions::RegionSummary,
    extractors::AuthAdmin,
    middleware::AppState,
    response::ApiResponse,
};

/// Create feedback router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feedbacks", post(submit_feedback))
        .route("/admin/feedbacks", get(list_feedbacks))
        .route("/admin/feedbacks/{id}", get(get_feedback))
        .route("/admin/feedbacks/{id}", patch(update_feedback))
}

/// Submitter identity block.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoRequest {
    #[validate(length(min = 1, max = 256))]
    pub full_name: String,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,
}

/// Feedback submission request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    #[validate(length(min = 1, max = 64))]
    pub region_id: String,

    #[validate(length(min = 1, max = 64))]
    pub rating_id: String,

    pub anonymous: bool,

    #[validate(length(min = 1, max = 8192))]
    pub message: String,

    #[validate(length(max = 256))]
    pub subject: Option<String>,

    #[validate(nested)]
    pub user_info: Option<UserInfoRequest>,
}

/// Feedback submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedFeedbackResponse {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    pub message: &'static str,
}

/// Submit a feedback (public).
async fn submit_feedback(
    State(state): State<AppState>,
    Json(req): Json<CreateFeedbackRequest>,
) -> AppResult<ApiResponse<SubmittedFeedbackResponse>> {
    req.validate()?;

    if !req.anonymous && req.user_info.is_none() {
        return Err(AppError::Validation(
            "userInfo is required for non-anonymous feedback".to_string(),
        ));
    }

    let feedback = state
        .feedback_service
        .create(CreateFeedbackInput {
            region_id: req.region_id,
            rating_id: req.rating_id,
            anonymous: req.anonymous,
            message: req.message,
            subject: req.subject,
            submitter: req.user_info.map(|info| SubmitterInfo {
                full_name: info.full_name,
                phone: info.phone,
                email: info.email,
            }),
        })
        .await?;

    Ok(ApiResponse::ok(SubmittedFeedbackResponse {
        id: feedback.id,
        submitted_at: feedback.submitted_at,
        message: "Thank you! Your feedback matters to us.",
    }))
}

/// The rating attached to a feedback.
#[derive(Debug, Serialize)]
pub struct RatingSummary {
    pub id: String,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Submitter identity inside a feedback response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Feedback response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: String,
    pub region_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionSummary>,
    pub rating_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfoResponse>,
    pub anonymous: bool,
    pub subject: Option<String>,
    pub message: String,
    pub status: FeedbackStatus,
    pub response: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<FeedbackRecord> for FeedbackResponse {
    fn from(record: FeedbackRecord) -> Self {
        let region = match &record.region {
            region @ regfeed_core::RegionRef::Resolved { .. } => Some(RegionSummary::from(region)),
            regfeed_core::RegionRef::Unresolved(_) => None,
        };

        let rating = record.rating.map(|r| RatingSummary {
            id: r.id,
            rating: r.rating,
            comment: r.comment,
        });

        let feedback = record.feedback;
        let user_info = if feedback.anonymous {
            None
        } else {
            Some(UserInfoResponse {
                full_name: feedback.contact_name.clone(),
                phone: feedback.contact_phone.clone(),
                email: feedback.contact_email.clone(),
            })
        };

        Self {
            id: feedback.id,
            region_id: feedback.region_id,
            region,
            rating_id: feedback.rating_id,
            rating,
            user_info,
            anonymous: feedback.anonymous,
            subject: feedback.subject,
            message: feedback.message,
            status: feedback.status,
            response: feedback.response,
            submitted_at: feedback.submitted_at,
        }
    }
}

/// Feedback list query.
#[derive(Debug, Deserialize, Validate)]
pub struct ListFeedbacksQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub limit: u64,
    pub region: Option<String>,
    pub status: Option<FeedbackStatus>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    10
}

/// List feedbacks visible to the caller (admin or above).
async fn list_feedbacks(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListFeedbacksQuery>,
) -> AppResult<ApiResponse<Page<FeedbackResponse>>> {
    query.validate()?;

    let page = state
        .feedback_service
        .list(
            &FeedbackListQuery {
                page: query.page,
                limit: query.limit,
                region: query.region,
                status: query.status,
                search: query.search,
                sort: query.sort,
            },
            &caller,
        )
        .await?;

    Ok(ApiResponse::ok(Page {
        meta: page.meta,
        data: page.data.into_iter().map(FeedbackResponse::from).collect(),
    }))
}

/// Fetch one feedback (admin or above, scope-checked).
async fn get_feedback(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FeedbackResponse>> {
    let record = state.feedback_service.get(&id, &caller).await?;

    Ok(ApiResponse::ok(FeedbackResponse::from(record)))
}

/// Feedback status update request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFeedbackRequest {
    pub status: FeedbackStatus,

    #[validate(length(max = 8192))]
    pub response: Option<String>,
}

/// Update status/response of a feedback (admin or above, scope-checked).
async fn update_feedback(
    AuthAdmin(caller): AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFeedbackRequest>,
) -> AppResult<ApiResponse<FeedbackResponse>> {
    req.validate()?;

    let record = state
        .feedback_service
        .update(
            &id,
            UpdateFeedbackInput {
                status: req.status,
                response: req.response,
            },
            &caller,
        )
        .await?;

    Ok(ApiResponse::ok(FeedbackResponse::from(record)))
}

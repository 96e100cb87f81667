//! Audit log endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use regfeed_common::AppResult;
use regfeed_db::entities::log_entry;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthAdmin, middleware::AppState, response::ApiResponse};

/// Create audit-log router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_logs))
}

/// Log list query.
#[derive(Debug, Deserialize, Validate)]
pub struct ListLogsQuery {
    pub cursor: Option<String>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u64,
    pub action: Option<String>,
}

const fn default_limit() -> u64 {
    50
}

/// One audit log entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryResponse {
    pub id: i64,
    pub action: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<log_entry::Model> for LogEntryResponse {
    fn from(entry: log_entry::Model) -> Self {
        Self {
            id: entry.id,
            action: entry.action,
            user_id: entry.user_id,
            timestamp: entry.timestamp,
        }
    }
}

/// Cursor pair of a log page.
#[derive(Debug, Serialize)]
pub struct LogCursorResponse {
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// A page of audit log entries.
#[derive(Debug, Serialize)]
pub struct LogPageResponse {
    pub data: Vec<LogEntryResponse>,
    pub cursor: LogCursorResponse,
}

/// List audit log entries with cursor pagination (authenticated).
async fn list_logs(
    AuthAdmin(_caller): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListLogsQuery>,
) -> AppResult<ApiResponse<LogPageResponse>> {
    query.validate()?;

    let page = state
        .log_service
        .list(query.cursor.as_deref(), query.limit, query.action.as_deref())
        .await?;

    Ok(ApiResponse::ok(LogPageResponse {
        data: page.data.into_iter().map(LogEntryResponse::from).collect(),
        cursor: LogCursorResponse {
            next: page.cursor.next,
            prev: page.cursor.prev,
        },
    }))
}

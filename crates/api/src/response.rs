//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard success envelope: `{"success": true, "data": ...}`.
///
/// Errors are rendered by [`regfeed_common::AppError`] and the envelope
/// middleware; handlers only ever build success responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true`; error responses come from the error path.
    pub success: bool,
    /// The payload.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

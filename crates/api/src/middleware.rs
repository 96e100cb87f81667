//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use regfeed_core::{
    AdminService, AuthService, FeedbackService, LogService, RatingService, RegionService,
    UserService,
};
use serde_json::{Value, json};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub admin_service: AdminService,
    pub rating_service: RatingService,
    pub feedback_service: FeedbackService,
    pub region_service: RegionService,
    pub user_service: UserService,
    pub log_service: LogService,
}

/// Authentication middleware.
///
/// Decodes a `Bearer` access credential into a caller identity and stashes
/// it in request extensions. Missing or invalid credentials simply leave
/// the identity absent; protected extractors reject from there, which lets
/// public endpoints use the identity opportunistically for scoping.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(caller) = state.auth_service.decode_access(token)
    {
        req.extensions_mut().insert(caller);
    }

    next.run(req).await
}

const ERROR_BODY_LIMIT: usize = 64 * 1024;

/// Error envelope middleware.
///
/// Rewrites every error response into the uniform envelope
/// `{success, message, statusCode, errors, timestamp, path}`. Error bodies
/// produced by the application already carry everything but `path`;
/// framework rejections (plain text) are wrapped whole.
pub async fn error_envelope_middleware(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = axum::body::to_bytes(body, ERROR_BODY_LIMIT).await else {
        return Response::from_parts(parts, Body::empty());
    };

    let mut envelope = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Value::Object(map),
        _ => {
            // Plain-text rejection from the framework: wrap it whole.
            let message = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if message.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                message
            };
            json!({
                "success": false,
                "message": message,
                "statusCode": status.as_u16(),
                "errors": [message],
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })
        }
    };

    if let Some(map) = envelope.as_object_mut() {
        map.insert("path".to_string(), Value::String(path));
    }

    let body = serde_json::to_vec(&envelope).unwrap_or_default();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    Response::from_parts(parts, Body::from(body))
}

//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use regfeed_core::RequestAdmin;

/// Authenticated admin extractor; rejects unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub RequestAdmin);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware when a valid credential was presented
        parts
            .extensions
            .get::<RequestAdmin>()
            .cloned()
            .map(AuthAdmin)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Optional authenticated admin extractor for public-but-scoped routes.
#[derive(Debug, Clone)]
pub struct MaybeAuthAdmin(pub Option<RequestAdmin>);

impl<S> FromRequestParts<S> for MaybeAuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<RequestAdmin>().cloned()))
    }
}

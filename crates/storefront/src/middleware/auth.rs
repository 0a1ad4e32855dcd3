//! Authentication boundary.
//!
//! Login, sessions, and token verification are delegated entirely to the
//! upstream auth layer (the hosted auth provider plus the edge in front of
//! this service). By the time a request arrives here the verified user id
//! has been injected as a header; this extractor only reads it. The service
//! must never be exposed without that layer in front of it.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use face_calendar_core::UserId;

/// Header carrying the verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(AuthenticatedUser(user_id): AuthenticatedUser) -> impl IntoResponse {
///     format!("cart for {user_id}")
/// }
/// ```
pub struct AuthenticatedUser(pub UserId);

/// Rejection returned when no user id is present.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "로그인이 필요합니다." })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(UserId::new(value)))
            .ok_or(AuthRejection)
    }
}

//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's identity, taken from the `x-user-id` header.
///
/// Session handling lives in front of this service; it is expected to
/// forward the resolved user id in the header.
#[derive(Debug, Clone, Copy)]
pub struct UserIdentity(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for UserIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {USER_ID_HEADER} header")))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized(format!("Invalid {USER_ID_HEADER} header")))?;
        UserId::parse(raw.trim())
            .map(UserIdentity)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid {USER_ID_HEADER} header: {e}")))
    }
}

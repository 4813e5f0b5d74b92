use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::PasskeepError;
use crate::service::Creator;

/// Request header carrying the caller identity, set by the gateway in front of the service.
pub const CREATOR_HEADER: &str = "x-creator";

impl<S> FromRequestParts<S> for Creator
where
    S: Send + Sync,
{
    type Rejection = PasskeepError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(CREATOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Creator::parse)
            .ok_or(PasskeepError::MissingCreator)
    }
}

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{auth::jwt::JwtKeys, error::ApiError};

const CREDENTIALS_REJECTED: &str = "Could not validate credentials";

/// Extracts and validates the bearer access token, yielding the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

/// Returns the token part of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Turns a raw access token into a trusted user id.
/// Every failure looks the same to the caller.
pub fn authenticate_bearer(keys: &JwtKeys, token: &str) -> Result<i64, ApiError> {
    let claims = keys.verify_access(token).map_err(|e| {
        warn!(reason = %e, "access token rejected");
        ApiError::Unauthenticated(CREDENTIALS_REJECTED.into())
    })?;
    claims.user_id().ok_or_else(|| {
        warn!(sub = %claims.sub, "access token subject is not a user id");
        ApiError::Unauthenticated(CREDENTIALS_REJECTED.into())
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            warn!("missing or non-bearer Authorization header");
            ApiError::Unauthenticated(CREDENTIALS_REJECTED.into())
        })?;
        let keys = JwtKeys::from_ref(state);
        authenticate_bearer(&keys, token).map(AuthUser)
    }
}

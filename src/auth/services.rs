use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::TokenPair,
        jwt::{JwtKeys, TokenError},
        password::verify_password_blocking,
    },
    error::ApiError,
    users::{repo::UserStore, repo_types::User},
};

/// Looks the user up by exact email and checks the password.
/// `None` covers both an unknown email and a wrong password.
#[instrument(skip(store, password))]
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(user) = store.find_by_email(email).await else {
        warn!("login unknown email");
        return Ok(None);
    };
    if !verify_password_blocking(password.to_owned(), user.password_hash.clone()).await? {
        warn!(user_id = user.id, "login invalid password");
        return Ok(None);
    }
    Ok(Some(user))
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<TokenPair, ApiError> {
    let user = authenticate(store, email, password)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid credentials".into()))?;
    let pair = keys.issue_pair(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(pair)
}

/// Trades a refresh token for a new pair. The old refresh token stays usable until it expires.
#[instrument(skip_all)]
pub async fn refresh(
    store: &dyn UserStore,
    keys: &JwtKeys,
    refresh_token: &str,
) -> Result<TokenPair, ApiError> {
    let claims = keys.verify_refresh(refresh_token).map_err(|e| match e {
        TokenError::Expired => {
            ApiError::Unauthenticated("Refresh token has expired. Please log in again.".into())
        }
        TokenError::Malformed => ApiError::Unauthenticated("Invalid refresh token".into()),
    })?;

    let user_id = claims.user_id().ok_or_else(|| {
        warn!(sub = %claims.sub, "refresh token subject is not a user id");
        ApiError::Unauthenticated("Invalid user ID format in token.".into())
    })?;

    let user = store.get(user_id).await.ok_or_else(|| {
        warn!(user_id, "refresh for missing user");
        ApiError::Unauthenticated("User not found or inactive.".into())
    })?;

    let pair = keys.issue_pair(user.id)?;
    info!(user_id = user.id, "tokens refreshed");
    Ok(pair)
}

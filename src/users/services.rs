use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::password::{hash_password_blocking, verify_password_blocking},
    error::ApiError,
    users::{
        dto::{ChangePasswordRequest, CreateUserRequest, PublicUser},
        repo::{StoreError, UserStore},
        repo_types::NewUser,
    },
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("User not found with id {id}"))
}

pub async fn list_users(store: &dyn UserStore) -> Vec<PublicUser> {
    store.list().await.into_iter().map(PublicUser::from).collect()
}

pub async fn get_user(store: &dyn UserStore, id: i64) -> Result<PublicUser, ApiError> {
    store.get(id).await.map(PublicUser::from).ok_or_else(|| not_found(id))
}

#[instrument(skip(store, req), fields(email = %req.email))]
pub async fn register(
    store: &dyn UserStore,
    req: CreateUserRequest,
) -> Result<PublicUser, ApiError> {
    if !is_valid_email(&req.email) {
        warn!("invalid email");
        return Err(ApiError::ValidationFailed("Invalid email address".into()));
    }

    let taken = || ApiError::Conflict(format!("User with email {} already exists", req.email));
    if store.find_by_email(&req.email).await.is_some() {
        warn!("email already registered");
        return Err(taken());
    }

    if req.password != req.password_confirmation {
        return Err(ApiError::ValidationFailed("Passwords do not match".into()));
    }

    let password_hash = hash_password_blocking(req.password.clone()).await?;
    let user = store
        .create(NewUser {
            full_name: req.full_name.clone(),
            email: req.email.clone(),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            StoreError::EmailTaken(_) => taken(),
            other => ApiError::Internal(other.into()),
        })?;

    info!(user_id = user.id, "user registered");
    Ok(user.into())
}

pub async fn delete_user(store: &dyn UserStore, id: i64) -> Result<(), ApiError> {
    store.delete(id).await.map_err(|_| not_found(id))?;
    info!(user_id = id, "user deleted");
    Ok(())
}

/// Replaces the caller's password hash. Tokens already issued stay valid.
#[instrument(skip(store, req))]
pub async fn change_password(
    store: &dyn UserStore,
    user_id: i64,
    req: ChangePasswordRequest,
) -> Result<(), ApiError> {
    if req.new_password != req.new_password_confirmation {
        return Err(ApiError::ValidationFailed("New passwords do not match".into()));
    }

    let user = store.get(user_id).await.ok_or_else(|| {
        warn!("password change for missing user");
        ApiError::Forbidden("Authentication required or user not found.".into())
    })?;

    if !verify_password_blocking(req.old_password, user.password_hash).await? {
        warn!("password change with wrong current password");
        return Err(ApiError::Unauthenticated("Invalid current password".into()));
    }

    let new_hash = hash_password_blocking(req.new_password).await?;
    store
        .update_password_hash(user_id, new_hash)
        .await
        .map_err(|_| ApiError::Forbidden("Authentication required or user not found.".into()))?;

    info!("password changed");
    Ok(())
}

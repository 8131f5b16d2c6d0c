use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        claims::TokenPair,
        dto::{LoginForm, RefreshRequest},
        services,
    },
    error::ApiError,
    extract::{Form, Json as JsonBody},
    state::AppState,
};

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(login))
        .route("/token/refresh", post(refresh))
}

#[instrument(skip(state, form), fields(email = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = services::login(
        state.store.as_ref(),
        &state.jwt,
        &form.username,
        &form.password,
    )
    .await?;
    Ok(Json(pair))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = services::refresh(state.store.as_ref(), &state.jwt, &payload.refresh_token).await?;
    Ok(Json(pair))
}

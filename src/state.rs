use crate::auth::jwt::JwtKeys;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::users::repo::{InMemoryUserStore, UserStore};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Ok(Self::from_parts(
            config,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(SystemClock),
        ))
    }

    pub fn from_parts(config: AppConfig, store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        let jwt = JwtKeys::new(&config.jwt, clock);
        Self {
            config: Arc::new(config),
            store,
            jwt,
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

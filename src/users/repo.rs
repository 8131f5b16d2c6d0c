use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::users::repo_types::{NewUser, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email {0} is already registered")]
    EmailTaken(String),
    #[error("user {0} not found")]
    NotFound(i64),
}

/// Persistence seam for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Vec<User>;
    async fn get(&self, id: i64) -> Option<User>;
    async fn find_by_email(&self, email: &str) -> Option<User>;
    /// Inserts with a fresh id; fails if another record already has the email.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn update_password_hash(&self, id: i64, password_hash: String) -> Result<(), StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    last_id: i64,
}

/// Map-backed store. One lock covers the records and the id sequence.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Vec<User> {
        let inner = self.inner.lock().await;
        inner.users.values().cloned().collect()
    }

    async fn get(&self, id: i64) -> Option<User> {
        self.inner.lock().await.users.get(&id).cloned()
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.lock().await;
        inner.users.values().find(|u| u.email == email).cloned()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::EmailTaken(new_user.email));
        }

        inner.last_id += 1;
        let user = User {
            id: inner.last_id,
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
        };
        inner.users.insert(user.id, user.clone());
        debug!(user_id = user.id, email = %user.email, "user inserted");
        Ok(user)
    }

    async fn update_password_hash(&self, id: i64, password_hash: String) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.password_hash = password_hash;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

use serde::{Deserialize, Serialize};

/// User record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,               // assigned by the store, starts at 1
    pub full_name: String,
    pub email: String,         // unique, compared exactly
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string, never exposed
}

/// Fields needed to insert a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

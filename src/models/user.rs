use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. The email is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub email: String,
    pub username: String,
    /// bcrypt hash. Never serialized into responses.
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// Data needed to insert a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

impl From<NewUser> for User {
    fn from(new_user: NewUser) -> Self {
        Self {
            email: new_user.email,
            username: new_user.username,
            password: new_user.password_hash,
        }
    }
}

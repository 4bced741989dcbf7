use sqlx::FromRow;
use uuid::Uuid;

/// Columns of `users` the auth flows read.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,         // trimmed + lowercased
    pub password_hash: String, // Argon2 hash
}

/// Fields supplied when inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: String,
}

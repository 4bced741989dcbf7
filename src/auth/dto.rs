use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for user registration. Absent fields stay `None` so they can
/// be reported as required.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// `data` of a successful registration. Id and password are never echoed.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub fullname: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoggedInUser {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Wraps a user under `{"user": ...}`.
#[derive(Debug, Serialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}

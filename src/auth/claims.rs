use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload bound to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,   // user ID
    pub iat: usize, // issued at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}

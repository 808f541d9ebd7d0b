use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::repo::UserProfile;

/// Request body for signup. Fields stay raw so each one can be validated
/// and reported on its own.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub display_name: Option<Value>,
    pub email: Option<Value>,
    pub password: Option<Value>,
    pub image: Option<Value>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<Value>,
    pub password: Option<Value>,
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public part of the user returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<UserProfile> for PublicUser {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name,
            email: p.email,
            image: p.image,
        }
    }
}

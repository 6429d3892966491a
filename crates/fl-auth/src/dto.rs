use super::*;
use fl_core::Unique;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub slug: String,
    #[serde(default)]
    pub instagram_handle: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in_ms: u64,
    pub creator: CreatorInfo,
}

/// Creator profile as returned to its owner. No password-adjacent fields.
#[derive(Debug, Serialize)]
pub struct CreatorInfo {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub slug: String,
    pub instagram_handle: Option<String>,
    pub bio: Option<String>,
    pub status: Status,
}

impl From<&Creator> for CreatorInfo {
    fn from(creator: &Creator) -> Self {
        Self {
            id: creator.id().to_string(),
            email: creator.email().to_string(),
            username: creator.username().to_string(),
            display_name: creator.display_name().to_string(),
            slug: creator.slug().to_string(),
            instagram_handle: creator.instagram_handle().map(String::from),
            bio: creator.bio().map(String::from),
            status: creator.status(),
        }
    }
}

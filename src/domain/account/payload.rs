//! Views of an account handed back to API callers

use serde::{Deserialize, Serialize};

/// Avatar used when an account has not set an image
pub const DEFAULT_IMAGE_URL: &str = "https://d2htdayykptdg9.cloudfront.net/sites/550f21d98e6927763a0003dd/content_entry582c570a882534008b009285/5915b878f16b6a008b2da574/files/noname-avatar.jpg";

/// What the account owner sees after registering or logging in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub username: String,
    pub email: String,
    pub token: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// What anyone sees when looking at an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub username: String,
    pub bio: Option<String>,
    pub image: String,
    pub following: bool,
}

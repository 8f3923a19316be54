//! Auth Session Model

use serde::{Deserialize, Serialize};

/// Signed-in user as reported by the auth endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Auth role (`authenticated`, `anon`, ...). Not an admin flag.
    #[serde(default)]
    pub role: Option<String>,
}

/// Active auth session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

impl Session {
    /// Whether `expires_at` has passed. Sessions without an expiry never expire.
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now_secs)
    }
}

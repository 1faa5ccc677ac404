use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted bearer token together with the refresh token that produced it.
///
/// `expires_at` already has the safety margin subtracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn new(access_token: String, refresh_token: String, expires_at: DateTime<Utc>) -> Self {
        Self { access_token, refresh_token, expires_at }
    }

    /// Strictly before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

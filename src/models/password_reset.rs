use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outstanding password-reset request (`password_reset_tokens`).
///
/// A redeemed token keeps `used = true` and stays in the collection until the
/// TTL monitor removes it after `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetToken {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub token: String,
    pub otp: String,
    pub created_at: DateTime,
    pub expires_at: DateTime,
    #[serde(default)]
    pub used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime>,
    #[serde(default)]
    pub attempts: i32,
}

impl PasswordResetToken {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        token: impl Into<String>,
        otp: impl Into<String>,
        created_at: DateTime,
        ttl: Duration,
    ) -> Self {
        Self {
            id: None,
            email: email.into(),
            token: token.into(),
            otp: otp.into(),
            created_at,
            expires_at: super::expiry(created_at, ttl),
            used: false,
            used_at: None,
            attempts: 0,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expires_at.timestamp_millis() <= now.timestamp_millis()
    }
}

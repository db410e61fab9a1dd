use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One active login session for a device (`user_sessions`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub session_id: String,
    pub refresh_token_hash: String,
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub created_at: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime>,
    pub expires_at: DateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl UserSession {
    /// Session created at `created_at` that expires `ttl` later.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        refresh_token_hash: impl Into<String>,
        device_id: impl Into<String>,
        created_at: DateTime,
        ttl: Duration,
    ) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            session_id: session_id.into(),
            refresh_token_hash: refresh_token_hash.into(),
            device_id: device_id.into(),
            device_name: None,
            ip_address: None,
            user_agent: None,
            location: None,
            created_at,
            last_activity_at: None,
            expires_at: super::expiry(created_at, ttl),
        }
    }

    #[must_use]
    pub fn with_device_name(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    #[must_use]
    pub fn with_client(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether the TTL monitor is allowed to remove this session at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expires_at.timestamp_millis() <= now.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::collections::user_sessions;
    use mongodb::bson::{Bson, to_document};

    fn session() -> UserSession {
        UserSession::new(
            "u1",
            "s1",
            "hash",
            "d1",
            DateTime::from_millis(1_700_000_000_000),
            Duration::from_secs(7 * 24 * 3600),
        )
    }

    #[test]
    fn minimal_session_serializes_without_optional_fields() -> anyhow::Result<()> {
        let doc = to_document(&session())?;

        assert!(!doc.contains_key("_id"));
        assert!(!doc.contains_key("deviceName"));
        assert!(!doc.contains_key("lastActivityAt"));
        assert_eq!(doc.get_str("sessionId")?, "s1");
        assert!(matches!(doc.get("expiresAt"), Some(Bson::DateTime(_))));
        user_sessions().check(&doc)?;
        Ok(())
    }

    #[test]
    fn full_session_passes_validator() -> anyhow::Result<()> {
        let session = session()
            .with_device_name("Firefox on Linux")
            .with_client("203.0.113.7", "Mozilla/5.0")
            .with_location(Location {
                country: Some("VN".to_string()),
                city: Some("Hanoi".to_string()),
                region: None,
                latitude: Some(21.03),
                longitude: Some(105.85),
            });

        user_sessions().check(&to_document(&session)?)?;
        Ok(())
    }

    #[test]
    fn expiry_is_relative_to_creation() {
        let session = session();
        assert!(!session.is_expired(session.created_at));
        assert!(session.is_expired(session.expires_at));
    }
}

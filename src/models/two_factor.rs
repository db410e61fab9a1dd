use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TwoFactorMethod {
    Totp,
    Email,
}

impl TwoFactorMethod {
    pub const ALL: [Self; 2] = [Self::Totp, Self::Email];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Totp => "TOTP",
            Self::Email => "EMAIL",
        }
    }
}

impl fmt::Display for TwoFactorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCode {
    pub code: String,
    pub used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime>,
}

impl BackupCode {
    #[must_use]
    pub fn unused(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            used: false,
            used_at: None,
        }
    }
}

/// 2FA configuration of one user (`two_factor_auth`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorAuth {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub method: TwoFactorMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub backup_codes: Vec<BackupCode>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<DateTime>,
    #[serde(default)]
    pub verification_attempts: i32,
}

impl TwoFactorAuth {
    /// Enabled configuration as written when a user turns 2FA on.
    #[must_use]
    pub fn enabled(user_id: impl Into<String>, method: TwoFactorMethod, at: DateTime) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            method,
            secret: None,
            backup_codes: Vec::new(),
            enabled: true,
            enabled_at: Some(at),
            disabled_at: None,
            last_verified_at: None,
            verification_attempts: 0,
        }
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn with_backup_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backup_codes = codes.into_iter().map(BackupCode::unused).collect();
        self
    }

    #[must_use]
    pub fn unused_backup_codes(&self) -> usize {
        self.backup_codes.iter().filter(|code| !code.used).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::collections::{TWO_FACTOR_METHODS, two_factor_auth};
    use mongodb::bson::to_document;

    #[test]
    fn methods_match_validator_enum() {
        let methods: Vec<&str> = TwoFactorMethod::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(methods, TWO_FACTOR_METHODS.to_vec());
    }

    #[test]
    fn method_serializes_uppercase() -> anyhow::Result<()> {
        let config = TwoFactorAuth::enabled("u1", TwoFactorMethod::Email, DateTime::now());
        let doc = to_document(&config)?;
        assert_eq!(doc.get_str("method")?, "EMAIL");
        two_factor_auth().check(&doc)?;
        Ok(())
    }

    #[test]
    fn totp_with_backup_codes_passes_validator() -> anyhow::Result<()> {
        let mut config = TwoFactorAuth::enabled("u1", TwoFactorMethod::Totp, DateTime::now())
            .with_secret("JBSWY3DPEHPK3PXP")
            .with_backup_codes(["1111-2222", "3333-4444", "5555-6666"]);
        config.backup_codes[1].used = true;
        config.backup_codes[1].used_at = Some(DateTime::now());

        assert_eq!(config.unused_backup_codes(), 2);
        two_factor_auth().check(&to_document(&config)?)?;
        Ok(())
    }
}

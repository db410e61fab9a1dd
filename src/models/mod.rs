//! Typed records for the provisioned collections.
//!
//! Field names are camelCase on the wire. Optional fields are skipped when
//! unset: the validators declare them with a concrete `bsonType`, so writing
//! `null` would be rejected.

pub mod account;
pub mod password_reset;
pub mod session;
pub mod two_factor;

pub use self::account::{Account, AccountStatus, Role};
pub use self::password_reset::PasswordResetToken;
pub use self::session::{Location, UserSession};
pub use self::two_factor::{BackupCode, TwoFactorAuth, TwoFactorMethod};

use mongodb::bson::DateTime;
use std::time::Duration;

/// `at + ttl`, saturating on overflow.
#[must_use]
pub fn expiry(at: DateTime, ttl: Duration) -> DateTime {
    let ttl = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    DateTime::from_millis(at.timestamp_millis().saturating_add(ttl))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_adds_ttl() {
        let at = DateTime::from_millis(1_000);
        assert_eq!(
            expiry(at, Duration::from_secs(2)).timestamp_millis(),
            3_000
        );
    }

    #[test]
    fn expiry_saturates() {
        let at = DateTime::from_millis(i64::MAX - 1);
        assert_eq!(
            expiry(at, Duration::from_secs(60)).timestamp_millis(),
            i64::MAX
        );
    }
}

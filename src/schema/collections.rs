use super::{CollectionSpec, Direction, Field, IndexSpec};
use crate::{Error, Result};
use std::time::Duration;

pub const USER_SESSIONS: &str = "user_sessions";
pub const PASSWORD_RESET_TOKENS: &str = "password_reset_tokens";
pub const TWO_FACTOR_AUTH: &str = "two_factor_auth";
pub const USERS: &str = "users";

/// TTL index name also used by the auth service when it starts.
pub const EXPIRES_AT_TTL: &str = "expiresAt_ttl";

// `\z`, not `$`: PCRE on the server lets `$` match before a trailing newline.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\z";
pub const OTP_PATTERN: &str = r"^[0-9]{6}\z";

/// 2FA methods accepted by `two_factor_auth.method`.
pub const TWO_FACTOR_METHODS: [&str; 2] = ["TOTP", "EMAIL"];

fn expires_at() -> IndexSpec {
    IndexSpec::ascending("expiresAt")
        .expire_after(Duration::ZERO)
        .named(EXPIRES_AT_TTL)
}

#[must_use]
pub fn user_sessions() -> CollectionSpec {
    let location = Field::object()
        .field("country", Field::string())
        .field("city", Field::string())
        .field("region", Field::string())
        .field("latitude", Field::double())
        .field("longitude", Field::double());

    let schema = Field::object()
        .required_field("userId", Field::string().describe("User ID - required"))
        .required_field(
            "sessionId",
            Field::string().describe("Unique session identifier - required"),
        )
        .required_field(
            "refreshTokenHash",
            Field::string().describe("Hashed refresh token - required"),
        )
        .required_field(
            "deviceId",
            Field::string().describe("Unique device identifier - required"),
        )
        .field(
            "deviceName",
            Field::string().describe("Device name (browser, OS, etc.)"),
        )
        .field("ipAddress", Field::string().describe("IP address of the device"))
        .field("userAgent", Field::string().describe("Full user agent string"))
        .field("location", location)
        .required_field(
            "createdAt",
            Field::date().describe("Session creation timestamp - required"),
        )
        .field("lastActivityAt", Field::date().describe("Last activity timestamp"))
        .required_field(
            "expiresAt",
            Field::date().describe("Session expiration timestamp - required"),
        );

    CollectionSpec::new(USER_SESSIONS)
        .with_schema(schema)
        .with_ordering("createdAt", "expiresAt")
        .with_index(
            IndexSpec::compound(&[
                ("userId", Direction::Ascending),
                ("sessionId", Direction::Ascending),
            ])
            .unique(),
        )
        .with_index(IndexSpec::ascending("sessionId").unique())
        .with_index(IndexSpec::ascending("userId"))
        .with_index(expires_at())
        .with_index(IndexSpec::ascending("deviceId"))
        .with_index(IndexSpec::descending("createdAt"))
}

#[must_use]
pub fn password_reset_tokens() -> CollectionSpec {
    let schema = Field::object()
        .required_field(
            "email",
            Field::string()
                .pattern(EMAIL_PATTERN)
                .describe("User email address - required"),
        )
        .required_field(
            "token",
            Field::string().describe("Unique reset token - required"),
        )
        .required_field(
            "otp",
            Field::string()
                .pattern(OTP_PATTERN)
                .describe("6-digit OTP code - required"),
        )
        .required_field(
            "createdAt",
            Field::date().describe("Token creation timestamp - required"),
        )
        .required_field(
            "expiresAt",
            Field::date().describe("Token expiration timestamp - required"),
        )
        .field("used", Field::bool().describe("Whether token has been used"))
        .field("usedAt", Field::date().describe("Timestamp when token was used"))
        .field(
            "attempts",
            Field::int()
                .minimum(0)
                .describe("Number of failed verification attempts"),
        );

    CollectionSpec::new(PASSWORD_RESET_TOKENS)
        .with_schema(schema)
        .with_ordering("createdAt", "expiresAt")
        .with_index(IndexSpec::ascending("token").unique())
        .with_index(IndexSpec::ascending("email"))
        .with_index(expires_at())
        .with_index(IndexSpec::compound(&[
            ("used", Direction::Ascending),
            ("expiresAt", Direction::Ascending),
        ]))
        .with_index(IndexSpec::descending("createdAt"))
}

#[must_use]
pub fn two_factor_auth() -> CollectionSpec {
    let backup_code = Field::object()
        .required_field("code", Field::string())
        .required_field("used", Field::bool())
        .field("usedAt", Field::date());

    let schema = Field::object()
        .required_field("userId", Field::string().describe("User ID - required"))
        .required_field(
            "method",
            Field::one_of(&TWO_FACTOR_METHODS).describe("2FA method: TOTP or EMAIL - required"),
        )
        .field(
            "secret",
            Field::string().describe("TOTP secret key (required for TOTP method)"),
        )
        .field(
            "backupCodes",
            Field::array(backup_code).describe("Array of backup codes with usage status"),
        )
        .required_field(
            "enabled",
            Field::bool().describe("Whether 2FA is enabled - required"),
        )
        .field(
            "enabledAt",
            Field::date().describe("Timestamp when 2FA was enabled"),
        )
        .field(
            "disabledAt",
            Field::date().describe("Timestamp when 2FA was disabled"),
        )
        .field(
            "lastVerifiedAt",
            Field::date().describe("Last successful 2FA verification"),
        )
        .field(
            "verificationAttempts",
            Field::int()
                .minimum(0)
                .describe("Failed verification attempts counter"),
        );

    CollectionSpec::new(TWO_FACTOR_AUTH)
        .with_schema(schema)
        .with_index(IndexSpec::ascending("userId").unique())
        .with_index(IndexSpec::ascending("enabled"))
        .with_index(IndexSpec::ascending("method"))
}

/// Account collection written by the seed step. The auth service owns its
/// shape, so only the uniqueness of logins is enforced here.
#[must_use]
pub fn users() -> CollectionSpec {
    CollectionSpec::new(USERS)
        .with_index(IndexSpec::ascending("username").unique())
        .with_index(IndexSpec::ascending("email").unique())
}

/// Collections created by `authdb collections`, in creation order.
#[must_use]
pub fn auth_collections() -> Vec<CollectionSpec> {
    vec![user_sessions(), password_reset_tokens(), two_factor_auth()]
}

/// Look up any known collection by name.
///
/// # Errors
/// Returns [`Error::UnknownCollection`] if `name` is not one of ours.
pub fn find(name: &str) -> Result<CollectionSpec> {
    auth_collections()
        .into_iter()
        .chain(std::iter::once(users()))
        .find(|spec| spec.name == name)
        .ok_or_else(|| Error::UnknownCollection(name.to_string()))
}

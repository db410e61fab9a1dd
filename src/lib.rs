//! # authdb (Auth Database Provisioning)
//!
//! `authdb` prepares the `MongoDB` database used by the auth service. It is run
//! once per environment (and safely re-run afterwards) by an operator or a
//! deployment job.
//!
//! ## Collections & Validators
//!
//! Three collections back the auth service's session and account-recovery
//! features. Each one carries a `$jsonSchema` validator installed with
//! `validationLevel: strict` / `validationAction: error`, so malformed writes are
//! rejected by the server instead of being coerced.
//!
//! - **`user_sessions`:** one document per device login, keyed by `sessionId`.
//! - **`password_reset_tokens`:** one document per outstanding reset request.
//! - **`two_factor_auth`:** one document per user holding the 2FA configuration.
//!
//! Validators are defined as typed Rust values in [`schema`] and rendered to
//! `$jsonSchema` documents; the same definitions drive the offline checker used
//! by `authdb validate`.
//!
//! ## Retention (TTL)
//!
//! Sessions and reset tokens carry `expiresAt`, indexed with
//! `expireAfterSeconds: 0`. The server's TTL monitor sweeps roughly every 60
//! seconds, so expired documents disappear eventually rather than at the exact
//! instant. Reset tokens marked `used` stay readable until that sweep.
//!
//! ## Seed Accounts
//!
//! Bootstrap accounts (admin, HR manager, HR) are upserted by their fixed `_id`
//! with `$setOnInsert`, so re-running the seed never duplicates or overwrites
//! an account.

pub mod cli;
pub mod error;
pub mod models;
pub mod schema;
pub mod seed;
pub mod storage;
pub mod users;
pub mod vault;

pub use self::error::{Error, Result};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Database targeted by `collections`, `seed` and `provision` unless overridden.
pub const DEFAULT_DATABASE: &str = "auth-db";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}

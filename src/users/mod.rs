//! Database users for the auth service.
//!
//! `ensure_user` creates the user or, if it already exists, resets its password
//! and roles, so the command can be re-run after a rotation.

use crate::{Error, Result};
use mongodb::{
    Database,
    bson::{Bson, Document, doc},
};
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

pub const DEFAULT_ROLE: &str = "readWrite";

/// One role granted on one database, written `role` or `role@db`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: String,
    pub db: Option<String>,
}

impl RoleGrant {
    /// Database the role applies to, falling back to the user's database.
    #[must_use]
    pub fn database<'a>(&'a self, default_db: &'a str) -> &'a str {
        self.db.as_deref().unwrap_or(default_db)
    }

    #[must_use]
    pub fn to_document(&self, default_db: &str) -> Document {
        doc! { "role": self.role.as_str(), "db": self.database(default_db) }
    }
}

impl FromStr for RoleGrant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (role, db) = match s.split_once('@') {
            Some((role, db)) => (role.trim(), Some(db.trim())),
            None => (s.trim(), None),
        };

        if role.is_empty() {
            return Err(format!("invalid role: {s:?}"));
        }

        match db {
            Some("") => Err(format!("invalid role database: {s:?}")),
            db => Ok(Self {
                role: role.to_string(),
                db: db.map(str::to_string),
            }),
        }
    }
}

impl fmt::Display for RoleGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.db {
            Some(db) => write!(f, "{}@{db}", self.role),
            None => f.write_str(&self.role),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    Created,
    Updated,
}

/// A `MongoDB` user defined on one database.
#[derive(Debug, Clone)]
pub struct DatabaseUser {
    pub name: String,
    pub password: SecretString,
    pub roles: Vec<RoleGrant>,
}

impl DatabaseUser {
    fn roles(&self, db: &str) -> Vec<Bson> {
        self.roles
            .iter()
            .map(|grant| Bson::Document(grant.to_document(db)))
            .collect()
    }

    /// `createUser` command, to be run against `db`.
    #[must_use]
    pub fn create_command(&self, db: &str) -> Document {
        doc! {
            "createUser": self.name.as_str(),
            "pwd": self.password.expose_secret(),
            "roles": self.roles(db),
        }
    }

    /// `updateUser` command replacing password and roles.
    #[must_use]
    pub fn update_command(&self, db: &str) -> Document {
        doc! {
            "updateUser": self.name.as_str(),
            "pwd": self.password.expose_secret(),
            "roles": self.roles(db),
        }
    }
}

/// Whether a `usersInfo` reply lists at least one user.
fn has_users(reply: &Document) -> Result<bool> {
    let users = reply
        .get_array("users")
        .map_err(|_| Error::Reply("usersInfo reply has no users array".to_string()))?;
    Ok(!users.is_empty())
}

/// Create `user` on `db`, or update it if it already exists.
///
/// # Errors
/// Returns an error if the connected user lacks `createUser`/`updateUser`
/// privileges or the server reply is unexpected.
#[instrument(skip(db, user), fields(db = %db.name(), user = %user.name))]
pub async fn ensure_user(db: &Database, user: &DatabaseUser) -> Result<UserOutcome> {
    let reply = db
        .run_command(doc! { "usersInfo": user.name.as_str() })
        .await?;

    if has_users(&reply)? {
        db.run_command(user.update_command(db.name())).await?;
        info!("user updated");
        Ok(UserOutcome::Updated)
    } else {
        db.run_command(user.create_command(db.name())).await?;
        info!("user created");
        Ok(UserOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> DatabaseUser {
        DatabaseUser {
            name: "auth-service".to_string(),
            password: SecretString::from("s3cret".to_string()),
            roles: roles.iter().filter_map(|r| r.parse().ok()).collect(),
        }
    }

    #[test]
    fn parse_role_grants() {
        assert_eq!(
            "readWrite".parse::<RoleGrant>(),
            Ok(RoleGrant {
                role: "readWrite".to_string(),
                db: None
            })
        );
        assert_eq!(
            "read@reporting".parse::<RoleGrant>(),
            Ok(RoleGrant {
                role: "read".to_string(),
                db: Some("reporting".to_string())
            })
        );
        assert!("@auth-db".parse::<RoleGrant>().is_err());
        assert!("read@".parse::<RoleGrant>().is_err());
    }

    #[test]
    fn role_grant_display_round_trips() {
        for input in ["readWrite", "dbAdmin@auth-db"] {
            let grant: RoleGrant = input.parse().unwrap();
            assert_eq!(grant.to_string(), input);
        }
    }

    #[test]
    fn create_command_defaults_role_database() {
        let command = user(&["readWrite", "read@reporting"]).create_command("auth-db");
        assert_eq!(
            command,
            doc! {
                "createUser": "auth-service",
                "pwd": "s3cret",
                "roles": [
                    { "role": "readWrite", "db": "auth-db" },
                    { "role": "read", "db": "reporting" },
                ],
            }
        );
    }

    #[test]
    fn update_command_replaces_password_and_roles() {
        let command = user(&["readWrite"]).update_command("auth-db");
        assert_eq!(command.get_str("updateUser").unwrap(), "auth-service");
        assert_eq!(command.get_str("pwd").unwrap(), "s3cret");
        assert_eq!(command.get_array("roles").unwrap().len(), 1);
    }

    #[test]
    fn debug_redacts_password() {
        assert!(!format!("{:?}", user(&["readWrite"])).contains("s3cret"));
    }

    #[test]
    fn users_info_reply() {
        assert!(!has_users(&doc! { "users": [], "ok": 1.0 }).unwrap());
        assert!(has_users(&doc! { "users": [{ "user": "auth-service" }], "ok": 1.0 }).unwrap());
        assert!(has_users(&doc! { "ok": 1.0 }).is_err());
    }
}

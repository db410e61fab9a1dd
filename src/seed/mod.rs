//! Bootstrap accounts for a fresh `users` collection.
//!
//! Each account has a fixed `_id` and is written with an upsert whose update is
//! `$setOnInsert` only, so a second run matches the existing document and
//! changes nothing. Passwords are stored as bcrypt hashes and are expected to be
//! changed after the first login.

use crate::{
    Error, Result,
    models::{Account, AccountStatus, Role},
    schema::collections::{USERS, users},
    storage::Provisioner,
};
use mongodb::{
    Database,
    bson::{DateTime, Document, doc, to_document},
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedAccount {
    pub id: Uuid,
    pub username: &'static str,
    pub email: &'static str,
    pub password_hash: &'static str,
    pub role: Role,
    pub company: Option<&'static str>,
}

pub const ACCOUNTS: [SeedAccount; 3] = [
    SeedAccount {
        id: Uuid::from_u128(1),
        username: "admin",
        email: "admin@workfitai.com",
        password_hash: "$2a$10$Brs6KoUQKyEAk4A/bX9IM.GU3WyoAUqCvRENCcjyYBrL35qcnTV2C",
        role: Role::Admin,
        company: None,
    },
    SeedAccount {
        id: Uuid::from_u128(2),
        username: "hrmanager_techcorp",
        email: "hrmanager@techcorp.com",
        password_hash: "$2a$10$Pqtbiw/2PLYxTdz9011OSezC5TbpVjYMYk3gI2pPBZxXBLRe6N4VC",
        role: Role::HrManager,
        company: Some("TechCorp Solutions"),
    },
    SeedAccount {
        id: Uuid::from_u128(3),
        username: "hr_techcorp",
        email: "hr@techcorp.com",
        password_hash: "$2a$10$guDe/4myTKCoPKNJc6HgCeyHjbm.z8AeeompYSB1Of/.EpLUuxFHi",
        role: Role::Hr,
        company: Some("TechCorp Solutions"),
    },
];

impl SeedAccount {
    #[must_use]
    pub fn to_account(&self, at: DateTime) -> Account {
        Account {
            id: self.id.to_string(),
            username: self.username.to_string(),
            email: self.email.to_string(),
            password: self.password_hash.to_string(),
            roles: vec![self.role],
            status: AccountStatus::Active,
            company: self.company.map(str::to_string),
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: Vec<String>,
    pub existing: Vec<String>,
}

/// Filter and update for an insert-only upsert of `account`.
///
/// # Errors
/// Returns an error if the account cannot be serialized.
pub fn upsert(account: &Account) -> Result<(Document, Document)> {
    let mut fields = to_document(account)?;
    fields.remove("_id");

    Ok((
        doc! { "_id": account.id.as_str() },
        doc! { "$setOnInsert": fields },
    ))
}

/// Ensure the `users` indexes exist, then upsert every bootstrap account.
///
/// # Errors
/// Returns [`Error::DuplicateKey`] if another account already holds one of the
/// seeded usernames or emails, or any other write error.
#[instrument(skip(db), fields(db = %db.name()))]
pub async fn run(db: &Database) -> Result<SeedReport> {
    Provisioner::new(db.clone()).apply(&users()).await?;

    let collection = db.collection::<Document>(USERS);
    let now = DateTime::now();
    let mut report = SeedReport::default();

    for seed in &ACCOUNTS {
        let (filter, update) = upsert(&seed.to_account(now))?;

        let result = collection
            .update_one(filter, update)
            .upsert(true)
            .await
            .map_err(|err| Error::from_write(USERS, err))?;

        if result.upserted_id.is_some() {
            info!(username = seed.username, "account created");
            report.inserted.push(seed.username.to_string());
        } else {
            debug!(username = seed.username, "account already exists");
            report.existing.push(seed.username.to_string());
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn accounts_are_unique() {
        let ids: HashSet<Uuid> = ACCOUNTS.iter().map(|a| a.id).collect();
        let usernames: HashSet<&str> = ACCOUNTS.iter().map(|a| a.username).collect();
        let emails: HashSet<&str> = ACCOUNTS.iter().map(|a| a.email).collect();

        assert_eq!(ids.len(), ACCOUNTS.len());
        assert_eq!(usernames.len(), ACCOUNTS.len());
        assert_eq!(emails.len(), ACCOUNTS.len());
    }

    #[test]
    fn password_hashes_are_bcrypt() {
        let bcrypt = Regex::new(r"^\$2[aby]\$\d{2}\$[./A-Za-z0-9]{53}$").unwrap();
        for account in &ACCOUNTS {
            assert!(
                bcrypt.is_match(account.password_hash),
                "{} has a malformed hash",
                account.username
            );
        }
    }

    #[test]
    fn admin_has_fixed_id_and_no_company() {
        let admin = ACCOUNTS[0].to_account(DateTime::now());
        assert_eq!(admin.id, "00000000-0000-0000-0000-000000000001");
        assert_eq!(admin.roles, vec![Role::Admin]);
        assert_eq!(admin.company, None);
        assert_eq!(admin.status, AccountStatus::Active);
    }

    #[test]
    fn upsert_only_sets_on_insert() -> anyhow::Result<()> {
        let at = DateTime::from_millis(1_700_000_000_000);
        let (filter, update) = upsert(&ACCOUNTS[1].to_account(at))?;

        assert_eq!(filter, doc! { "_id": "00000000-0000-0000-0000-000000000002" });
        assert_eq!(update.keys().collect::<Vec<_>>(), vec!["$setOnInsert"]);

        let fields = update.get_document("$setOnInsert")?;
        assert!(!fields.contains_key("_id"));
        assert_eq!(fields.get_str("username")?, "hrmanager_techcorp");
        assert_eq!(fields.get_str("company")?, "TechCorp Solutions");
        assert_eq!(fields.get("createdAt"), Some(&Bson::DateTime(at)));
        Ok(())
    }
}

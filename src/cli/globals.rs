use crate::vault::database::DatabaseCreds;
use anyhow::{Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

/// Connection settings shared by every database action.
#[derive(Clone)]
pub struct GlobalArgs {
    pub uri: SecretString,
    pub database: String,
    pub vault_token: SecretString,
    pub vault_db_username: String,
    pub vault_db_password: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(uri: String, database: String) -> Self {
        Self {
            uri: SecretString::from(uri),
            database,
            vault_token: SecretString::default(),
            vault_db_username: String::new(),
            vault_db_password: SecretString::default(),
        }
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.vault_token = token;
    }

    /// Keep the leased username and password. The lease is not renewed: it
    /// only has to outlive one provisioning run.
    pub fn set_database_creds(&mut self, creds: DatabaseCreds) {
        debug!(
            lease_id = %creds.lease_id,
            lease_duration = creds.lease_duration,
            "database credentials leased"
        );
        self.vault_db_username = creds.username;
        self.vault_db_password = creds.password;
    }

    /// The connection string with the Vault credentials set as userinfo, or
    /// the URI unchanged when no credentials were fetched.
    ///
    /// # Errors
    /// Returns an error if the URI cannot be parsed or cannot carry credentials
    /// (multi-host seed lists are not supported together with Vault).
    pub fn connection_uri(&self) -> Result<SecretString> {
        if self.vault_db_username.is_empty() {
            return Ok(self.uri.clone());
        }

        let mut uri = Url::parse(self.uri.expose_secret())?;

        uri.set_username(&self.vault_db_username)
            .map_err(|()| anyhow!("Error setting username"))?;

        uri.set_password(Some(self.vault_db_password.expose_secret()))
            .map_err(|()| anyhow!("Error setting password"))?;

        Ok(SecretString::from(uri.to_string()))
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("uri", &"***")
            .field("database", &self.database)
            .field("vault_token", &"***")
            .field("vault_db_username", &self.vault_db_username)
            .field("vault_db_password", &"***")
            .finish()
    }
}

use crate::{cli::globals::GlobalArgs, storage, vault};
use anyhow::{Context, Result};
use mongodb::Database;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

#[derive(Debug)]
pub struct VaultArgs {
    pub url: String,
    pub role_id: String,
    pub secret_id: Option<SecretString>,
    pub wrapped_token: Option<SecretString>,
    pub db_creds_path: String,
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub vault: Option<VaultArgs>,
}

/// Resolve credentials (from Vault when configured), connect and return the
/// target database.
///
/// # Errors
/// Returns an error if Vault login, the credentials request or the `MongoDB`
/// connection fails.
pub async fn connect(args: Args) -> Result<Database> {
    let mut globals = args.globals;

    if let Some(vault_args) = args.vault {
        let token = vault::login(
            &vault_args.url,
            &vault_args.role_id,
            vault_args.secret_id.as_ref().map(|s| s.expose_secret()),
            vault_args.wrapped_token.as_ref().map(|s| s.expose_secret()),
        )
        .await
        .context("Vault login failed")?;
        globals.set_token(token);

        let creds =
            vault::database::database_creds(&vault_args.url, &globals.vault_token, &vault_args.db_creds_path)
                .await
                .context("Could not get database username and password")?;
        globals.set_database_creds(creds);
    }

    debug!("Global args: {:?}", globals);

    let uri = globals.connection_uri()?;

    let client = storage::connect(uri.expose_secret())
        .await
        .context("Could not connect to MongoDB")?;

    Ok(client.database(&globals.database))
}

use crate::vault::database::DEFAULT_CREDS_PATH;
use clap::{Arg, Command};

pub const ARG_VAULT_URL: &str = "vault-url";
pub const ARG_VAULT_ROLE_ID: &str = "vault-role-id";
pub const ARG_VAULT_SECRET_ID: &str = "vault-secret-id";
pub const ARG_VAULT_WRAPPED_TOKEN: &str = "vault-wrapped-token";
pub const ARG_VAULT_DB_CREDS_PATH: &str = "vault-db-creds-path";

/// Vault is optional: without `--vault-url` the URI is used as given.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VAULT_URL)
                .long(ARG_VAULT_URL)
                .help("Vault approle login URL, example: https://vault.tld:8200/v1/auth/approle/login")
                .env("AUTHDB_VAULT_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_VAULT_ROLE_ID)
                .long(ARG_VAULT_ROLE_ID)
                .help("Vault role id")
                .env("AUTHDB_VAULT_ROLE_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_VAULT_SECRET_ID)
                .long(ARG_VAULT_SECRET_ID)
                .help("Vault secret id")
                .env("AUTHDB_VAULT_SECRET_ID")
                .global(true)
                .conflicts_with(ARG_VAULT_WRAPPED_TOKEN),
        )
        .arg(
            Arg::new(ARG_VAULT_WRAPPED_TOKEN)
                .long(ARG_VAULT_WRAPPED_TOKEN)
                .help("Vault wrapped token holding the secret id")
                .env("AUTHDB_VAULT_WRAPPED_TOKEN")
                .global(true),
        )
        .arg(
            Arg::new(ARG_VAULT_DB_CREDS_PATH)
                .long(ARG_VAULT_DB_CREDS_PATH)
                .help("Vault database secrets engine path for MongoDB credentials")
                .env("AUTHDB_VAULT_DB_CREDS_PATH")
                .default_value(DEFAULT_CREDS_PATH)
                .global(true),
        )
}

/// Check that a Vault URL comes with the arguments needed to log in.
///
/// # Errors
/// Returns an error string naming the missing argument.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    if !matches.contains_id(ARG_VAULT_URL) {
        return Ok(());
    }

    if !matches.contains_id(ARG_VAULT_ROLE_ID) {
        return Err("Missing required argument: --vault-role-id (required with --vault-url)".to_string());
    }

    if !matches.contains_id(ARG_VAULT_SECRET_ID) && !matches.contains_id(ARG_VAULT_WRAPPED_TOKEN) {
        return Err(
            "Missing required argument: --vault-secret-id or --vault-wrapped-token (required with --vault-url)"
                .to_string(),
        );
    }

    Ok(())
}

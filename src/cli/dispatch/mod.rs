use crate::{
    cli::{
        actions::{Action, collections, connection, provision, seed, user, validate},
        commands::{
            self, ARG_COLLECTION, ARG_DRY_RUN, ARG_FILE, ARG_PASSWORD, ARG_ROLE, ARG_USER_DB,
            ARG_USERNAME, CMD_COLLECTIONS, CMD_PROVISION, CMD_SEED, CMD_USER, CMD_VALIDATE,
            mongo::{ARG_DATABASE, ARG_URI},
            vault::{
                ARG_VAULT_DB_CREDS_PATH, ARG_VAULT_ROLE_ID, ARG_VAULT_SECRET_ID, ARG_VAULT_URL,
                ARG_VAULT_WRAPPED_TOKEN,
            },
        },
        globals::GlobalArgs,
    },
    users::{DEFAULT_ROLE, DatabaseUser, RoleGrant},
    vault::database::DEFAULT_CREDS_PATH,
};
use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;

fn vault_args(matches: &ArgMatches) -> Result<Option<connection::VaultArgs>> {
    let Some(url) = matches.get_one::<String>(ARG_VAULT_URL).cloned() else {
        return Ok(None);
    };

    commands::vault::validate(matches).map_err(|e| anyhow!(e))?;

    Ok(Some(connection::VaultArgs {
        url,
        role_id: matches
            .get_one::<String>(ARG_VAULT_ROLE_ID)
            .cloned()
            .context("missing required argument: --vault-role-id")?,
        secret_id: matches
            .get_one::<String>(ARG_VAULT_SECRET_ID)
            .cloned()
            .map(SecretString::from),
        wrapped_token: matches
            .get_one::<String>(ARG_VAULT_WRAPPED_TOKEN)
            .cloned()
            .map(SecretString::from),
        db_creds_path: matches
            .get_one::<String>(ARG_VAULT_DB_CREDS_PATH)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CREDS_PATH.to_string()),
    }))
}

/// Connection arguments for `database`.
fn connection_args(matches: &ArgMatches, database: String) -> Result<connection::Args> {
    let uri = matches
        .get_one::<String>(ARG_URI)
        .cloned()
        .context("missing required argument: --uri")?;

    Ok(connection::Args {
        globals: GlobalArgs::new(uri, database),
        vault: vault_args(matches)?,
    })
}

fn database(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>(ARG_DATABASE)
        .cloned()
        .unwrap_or_else(|| crate::DEFAULT_DATABASE.to_string())
}

/// Connection for a step that supports `--dry-run`, which needs none.
fn optional_connection(matches: &ArgMatches) -> Result<(Option<connection::Args>, bool)> {
    let dry_run = matches.get_flag(ARG_DRY_RUN);

    let connection = if dry_run {
        None
    } else {
        Some(connection_args(matches, database(matches))?)
    };

    Ok((connection, dry_run))
}

fn user_args(matches: &ArgMatches) -> Result<user::Args> {
    let user_db = matches
        .get_one::<String>(ARG_USER_DB)
        .cloned()
        .unwrap_or_else(|| database(matches));

    let name = matches
        .get_one::<String>(ARG_USERNAME)
        .cloned()
        .context("missing required argument: --username")?;

    let password = matches
        .get_one::<String>(ARG_PASSWORD)
        .cloned()
        .context("missing required argument: --password")?;

    let roles: Vec<RoleGrant> = match matches.get_many::<RoleGrant>(ARG_ROLE) {
        Some(roles) => roles.cloned().collect(),
        None => vec![RoleGrant {
            role: DEFAULT_ROLE.to_string(),
            db: None,
        }],
    };

    Ok(user::Args {
        connection: connection_args(matches, user_db)?,
        user: DatabaseUser {
            name,
            password: SecretString::from(password),
            roles,
        },
    })
}

/// Map the parsed command line to the action to run.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((CMD_COLLECTIONS, sub)) => {
            let (connection, dry_run) = optional_connection(sub)?;
            Ok(Action::Collections(collections::Args {
                connection,
                dry_run,
            }))
        }
        Some((CMD_SEED, sub)) => {
            let (connection, dry_run) = optional_connection(sub)?;
            Ok(Action::Seed(seed::Args {
                connection,
                dry_run,
            }))
        }
        Some((CMD_PROVISION, sub)) => Ok(Action::Provision(provision::Args {
            connection: connection_args(sub, database(sub))?,
        })),
        Some((CMD_USER, sub)) => Ok(Action::User(user_args(sub)?)),
        Some((CMD_VALIDATE, sub)) => Ok(Action::Validate(validate::Args {
            collection: sub
                .get_one::<String>(ARG_COLLECTION)
                .cloned()
                .context("missing required argument: --collection")?,
            file: sub
                .get_one::<String>(ARG_FILE)
                .map(PathBuf::from)
                .context("missing required argument: --file")?,
        })),
        Some((name, _)) => bail!("unknown subcommand: {name}"),
        None => bail!("missing subcommand"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const CLEAR: [(&str, Option<&str>); 9] = [
        ("AUTHDB_URI", None),
        ("AUTHDB_DATABASE", None),
        ("AUTHDB_VAULT_URL", None),
        ("AUTHDB_VAULT_ROLE_ID", None),
        ("AUTHDB_VAULT_SECRET_ID", None),
        ("AUTHDB_VAULT_WRAPPED_TOKEN", None),
        ("AUTHDB_USER_DB", None),
        ("AUTHDB_USER_NAME", None),
        ("AUTHDB_USER_PASSWORD", None),
    ];

    fn dispatch(args: &[&str]) -> Result<Action> {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().try_get_matches_from(args.iter().copied())?;
            handler(&matches)
        })
    }

    #[test]
    fn dry_run_needs_no_uri() {
        let action = dispatch(&["authdb", "collections", "--dry-run"]).unwrap();
        assert!(matches!(
            action,
            Action::Collections(collections::Args {
                connection: None,
                dry_run: true
            })
        ));
    }

    #[test]
    fn seed_requires_uri() {
        let err = dispatch(&["authdb", "seed"]).unwrap_err();
        assert_eq!(err.to_string(), "missing required argument: --uri");
    }

    #[test]
    fn provision_uses_database() {
        let action = dispatch(&[
            "authdb",
            "provision",
            "--uri",
            "mongodb://localhost:27017",
            "--database",
            "auth-test",
        ])
        .unwrap();

        let Action::Provision(args) = action else {
            panic!("expected provision");
        };
        assert_eq!(args.connection.globals.database, "auth-test");
        assert!(args.connection.vault.is_none());
    }

    #[test]
    fn user_defaults_to_database() {
        let action = dispatch(&[
            "authdb",
            "--uri",
            "mongodb://localhost:27017",
            "user",
            "--username",
            "auth-service",
            "--password",
            "s3cret",
        ])
        .unwrap();

        let Action::User(args) = action else {
            panic!("expected user");
        };
        assert_eq!(args.connection.globals.database, "auth-db");
        assert_eq!(args.user.name, "auth-service");
        assert_eq!(args.user.password.expose_secret(), "s3cret");
        assert_eq!(args.user.roles.len(), 1);
        assert_eq!(args.user.roles[0].role, "readWrite");
    }

    #[test]
    fn user_on_other_database() {
        let action = dispatch(&[
            "authdb",
            "user",
            "--uri",
            "mongodb://localhost:27017",
            "--user-db",
            "admin",
            "--username",
            "ops",
            "--password",
            "pw",
            "--role",
            "readWrite@auth-db",
        ])
        .unwrap();

        let Action::User(args) = action else {
            panic!("expected user");
        };
        assert_eq!(args.connection.globals.database, "admin");
        assert_eq!(args.user.roles[0].database("admin"), "auth-db");
    }

    #[test]
    fn vault_args_are_collected() {
        let action = dispatch(&[
            "authdb",
            "provision",
            "--uri",
            "mongodb://mongo:27017",
            "--vault-url",
            "https://vault.tld:8200/v1/auth/approle/login",
            "--vault-role-id",
            "role-id",
            "--vault-wrapped-token",
            "wrapped",
        ])
        .unwrap();

        let Action::Provision(args) = action else {
            panic!("expected provision");
        };
        let vault = args.connection.vault.unwrap();
        assert_eq!(vault.role_id, "role-id");
        assert!(vault.secret_id.is_none());
        assert_eq!(vault.wrapped_token.unwrap().expose_secret(), "wrapped");
        assert_eq!(vault.db_creds_path, DEFAULT_CREDS_PATH);
    }

    #[test]
    fn vault_without_secret_fails() {
        let err = dispatch(&[
            "authdb",
            "provision",
            "--uri",
            "mongodb://mongo:27017",
            "--vault-url",
            "https://vault.tld:8200/v1/auth/approle/login",
            "--vault-role-id",
            "role-id",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--vault-secret-id"));
    }

    #[test]
    fn validate_args() {
        let action = dispatch(&[
            "authdb",
            "validate",
            "--collection",
            "user_sessions",
            "--file",
            "session.json",
        ])
        .unwrap();

        let Action::Validate(args) = action else {
            panic!("expected validate");
        };
        assert_eq!(args.collection, "user_sessions");
        assert_eq!(args.file, PathBuf::from("session.json"));
    }
}

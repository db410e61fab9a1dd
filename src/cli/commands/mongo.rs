use clap::{Arg, Command};

pub const ARG_URI: &str = "uri";
pub const ARG_DATABASE: &str = "database";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_URI)
                .short('u')
                .long(ARG_URI)
                .help("MongoDB connection string")
                .long_help(
                    "MongoDB connection string. When Vault is configured, username/password are injected from Vault DB creds, so they are not required in the URI.",
                )
                .env("AUTHDB_URI")
                .global(true),
        )
        .arg(
            Arg::new(ARG_DATABASE)
                .short('d')
                .long(ARG_DATABASE)
                .help("Database holding the auth collections")
                .env("AUTHDB_DATABASE")
                .default_value(crate::DEFAULT_DATABASE)
                .global(true),
        )
}

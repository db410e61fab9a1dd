pub mod logging;
pub mod mongo;
pub mod vault;

use crate::{schema::collections, users::RoleGrant};
use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::{
        PossibleValuesParser,
        styling::{AnsiColor, Effects, Styles},
    },
};

pub const CMD_COLLECTIONS: &str = "collections";
pub const CMD_SEED: &str = "seed";
pub const CMD_PROVISION: &str = "provision";
pub const CMD_USER: &str = "user";
pub const CMD_VALIDATE: &str = "validate";

pub const ARG_DRY_RUN: &str = "dry-run";
pub const ARG_USER_DB: &str = "user-db";
pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_ROLE: &str = "role";
pub const ARG_COLLECTION: &str = "collection";
pub const ARG_FILE: &str = "file";

fn dry_run() -> Arg {
    Arg::new(ARG_DRY_RUN)
        .long(ARG_DRY_RUN)
        .help("Print the commands as extended JSON instead of running them")
        .action(ArgAction::SetTrue)
}

fn user_command() -> Command {
    Command::new(CMD_USER)
        .about("Create or update the database user of the auth service")
        .arg(
            Arg::new(ARG_USER_DB)
                .long(ARG_USER_DB)
                .help("Database the user is defined on (default: --database)")
                .env("AUTHDB_USER_DB"),
        )
        .arg(
            Arg::new(ARG_USERNAME)
                .long(ARG_USERNAME)
                .help("User name")
                .env("AUTHDB_USER_NAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("User password")
                .env("AUTHDB_USER_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_ROLE)
                .long(ARG_ROLE)
                .help("Role to grant, as role or role@db (repeatable)")
                .action(ArgAction::Append)
                .default_value(crate::users::DEFAULT_ROLE)
                .value_parser(clap::value_parser!(RoleGrant)),
        )
}

fn validate_command() -> Command {
    let names: Vec<&'static str> = collections::auth_collections()
        .iter()
        .map(|spec| spec.name)
        .chain(std::iter::once(collections::USERS))
        .collect();

    Command::new(CMD_VALIDATE)
        .about("Check JSON documents against a collection schema without a server")
        .arg(
            Arg::new(ARG_COLLECTION)
                .short('c')
                .long(ARG_COLLECTION)
                .help("Collection whose schema is checked")
                .required(true)
                .value_parser(PossibleValuesParser::new(names)),
        )
        .arg(
            Arg::new(ARG_FILE)
                .short('f')
                .long(ARG_FILE)
                .help("JSON file holding one document or an array of documents")
                .required(true),
        )
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("authdb")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_COLLECTIONS)
                .about("Create collections, validators and indexes")
                .arg(dry_run()),
        )
        .subcommand(
            Command::new(CMD_SEED)
                .about("Insert the bootstrap accounts into users")
                .arg(dry_run()),
        )
        .subcommand(Command::new(CMD_PROVISION).about("Run collections, then seed"))
        .subcommand(user_command())
        .subcommand(validate_command());

    let command = mongo::with_args(command);
    let command = vault::with_args(command);
    logging::with_args(command)
}

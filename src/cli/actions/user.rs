use crate::{
    cli::actions::connection,
    users::{self, DatabaseUser, UserOutcome},
};
use anyhow::{Context, Result};

#[derive(Debug)]
pub struct Args {
    /// Connection whose database is the one the user is defined on.
    pub connection: connection::Args,
    pub user: DatabaseUser,
}

/// Execute the user action.
/// # Errors
/// Returns an error if connecting fails or the server refuses to create or update the user.
pub async fn execute(args: Args) -> Result<()> {
    let db = connection::connect(args.connection).await?;

    let outcome = users::ensure_user(&db, &args.user)
        .await
        .with_context(|| format!("Could not provision user {}", args.user.name))?;

    let verb = match outcome {
        UserOutcome::Created => "created",
        UserOutcome::Updated => "updated",
    };

    let roles: Vec<String> = args
        .user
        .roles
        .iter()
        .map(|grant| format!("{}@{}", grant.role, grant.database(db.name())))
        .collect();

    println!("{}: {verb} on {} [{}]", args.user.name, db.name(), roles.join(", "));

    Ok(())
}

use crate::{
    cli::actions::{connection, output},
    schema::collections::users,
    seed::{self, ACCOUNTS, SeedReport},
    storage,
};
use anyhow::{Context, Result};
use mongodb::bson::{DateTime, Document, doc};

#[derive(Debug)]
pub struct Args {
    /// `None` only for a dry run.
    pub connection: Option<connection::Args>,
    pub dry_run: bool,
}

/// `users` index commands followed by one `update` command per account.
fn plan(at: DateTime) -> Result<Vec<Document>> {
    let mut commands = storage::plan(&[users()]);

    for account in &ACCOUNTS {
        let (filter, update) = seed::upsert(&account.to_account(at))?;
        commands.push(doc! {
            "update": users().name,
            "updates": [{ "q": filter, "u": update, "upsert": true }],
        });
    }

    Ok(commands)
}

pub(crate) fn print_report(report: &SeedReport) {
    for username in &report.inserted {
        println!("{username}: created");
    }
    for username in &report.existing {
        println!("{username}: exists");
    }
}

/// Execute the seed action.
/// # Errors
/// Returns an error if connecting fails or an account cannot be written.
pub async fn execute(args: Args) -> Result<()> {
    if args.dry_run {
        println!("{}", output::to_extjson(plan(DateTime::now())?)?);
        return Ok(());
    }

    let connection = args
        .connection
        .context("missing required argument: --uri")?;
    let db = connection::connect(connection).await?;

    let report = seed::run(&db).await.context("Could not seed accounts")?;
    print_report(&report);

    Ok(())
}

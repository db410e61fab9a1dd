use crate::{
    cli::actions::{connection, output},
    schema::collections::auth_collections,
    storage::{self, Provisioner},
};
use anyhow::{Context, Result};

#[derive(Debug)]
pub struct Args {
    /// `None` only for a dry run.
    pub connection: Option<connection::Args>,
    pub dry_run: bool,
}

/// Execute the collections action.
/// # Errors
/// Returns an error if connecting or provisioning any collection fails.
pub async fn execute(args: Args) -> Result<()> {
    let specs = auth_collections();

    if args.dry_run {
        println!("{}", output::to_extjson(storage::plan(&specs))?);
        return Ok(());
    }

    let connection = args
        .connection
        .context("missing required argument: --uri")?;
    let db = connection::connect(connection).await?;

    let reports = Provisioner::new(db)
        .apply_all(&specs)
        .await
        .context("Could not provision collections")?;

    for report in &reports {
        println!("{}", output::collection_line(report));
    }

    Ok(())
}

use crate::{
    cli::actions::{connection, output, seed::print_report},
    schema::collections::auth_collections,
    seed,
    storage::Provisioner,
};
use anyhow::{Context, Result};

#[derive(Debug)]
pub struct Args {
    pub connection: connection::Args,
}

/// Create the collections, then seed the accounts, over one connection.
/// # Errors
/// Returns an error if any step fails; later steps are not run.
pub async fn execute(args: Args) -> Result<()> {
    let db = connection::connect(args.connection).await?;

    let reports = Provisioner::new(db.clone())
        .apply_all(&auth_collections())
        .await
        .context("Could not provision collections")?;

    for report in &reports {
        println!("{}", output::collection_line(report));
    }

    let report = seed::run(&db).await.context("Could not seed accounts")?;
    print_report(&report);

    Ok(())
}

use crate::cli::actions::{Action, collections, provision, seed, user, validate};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point: a new `Action::*` variant gets its `*::execute` call here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Collections(args) => collections::execute(args).await,
        Action::Seed(args) => seed::execute(args).await,
        Action::Provision(args) => provision::execute(args).await,
        Action::User(args) => user::execute(args).await,
        Action::Validate(args) => validate::execute(&args),
    }
}

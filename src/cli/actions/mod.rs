pub mod collections;
pub mod connection;
pub mod output;
pub mod provision;
pub mod seed;
pub mod user;
pub mod validate;

// Internal "interpreter" for `Action`.
mod run;

#[derive(Debug)]
pub enum Action {
    Collections(collections::Args),
    Seed(seed::Args),
    Provision(provision::Args),
    User(user::Args),
    Validate(validate::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

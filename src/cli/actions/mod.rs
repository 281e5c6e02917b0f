pub mod guard;
pub mod login;
pub mod logout;
pub mod status;

// Single dispatch point, kept apart so this file only lists the actions.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout(GlobalArgs),
    Status(GlobalArgs),
    Guard(guard::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

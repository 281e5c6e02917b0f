use crate::cli::actions::{guard, login, logout, status, Action};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Logout(globals) => logout::execute(&globals),
        Action::Status(globals) => status::execute(&globals),
        Action::Guard(args) => guard::execute(&args),
    }
}

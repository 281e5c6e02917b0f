use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Result};

/// Forget the stored session. Nothing is revoked on the server.
/// # Errors
/// Returns an error if the session file exists but cannot be removed.
pub fn execute(globals: &GlobalArgs) -> Result<()> {
    let guard = globals.session_guard()?;

    if !guard.logout() {
        return Err(anyhow!(
            "could not remove session file {}",
            globals.token_file.display()
        ));
    }

    println!("Logged out");

    Ok(())
}

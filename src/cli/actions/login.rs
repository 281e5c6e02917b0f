use crate::cli::globals::GlobalArgs;
use crate::session::Credentials;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::io::BufRead;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: Option<SecretString>,
}

/// Log in and persist the session.
/// # Errors
/// Returns an error if the credentials are rejected, the API is unreachable or
/// the session cannot be stored. The stored session is untouched on failure.
pub async fn execute(args: Args) -> Result<()> {
    let guard = args.globals.session_guard()?;

    let password = match args.password {
        Some(password) => password,
        None => read_password(std::io::stdin().lock())?,
    };

    let credentials = Credentials::new(args.email, password);
    debug!("logging in via {}", args.globals.api_url);

    guard.login(&credentials).await.context("Login failed")?;

    println!("Logged in, continue at {}", guard.policy().landing_path());

    Ok(())
}

/// Reads a single line, without its line terminator.
fn read_password(mut input: impl BufRead) -> Result<SecretString> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    Ok(SecretString::from(password))
}

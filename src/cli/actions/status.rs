use crate::cli::globals::GlobalArgs;
use crate::session::{SessionState, SessionStatus};
use crate::GIT_COMMIT_HASH;
use anyhow::Result;

/// Show the stored session and build information.
/// # Errors
/// Returns an error if the session guard cannot be assembled.
pub fn execute(globals: &GlobalArgs) -> Result<()> {
    let guard = globals.session_guard()?;
    let status = guard.status();

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        GIT_COMMIT_HASH
    };

    println!("{} {} ({short_hash})", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("api: {}", globals.api_url);
    println!("session file: {}", globals.token_file.display());
    println!("{}", describe(&status));

    Ok(())
}

#[must_use]
pub fn describe(status: &SessionStatus) -> String {
    let session = match (status.state, status.remaining_secs) {
        (SessionState::Authenticated, Some(remaining)) => {
            format!("session: authenticated, expires in {remaining}s")
        }
        (SessionState::Authenticated, None) => "session: authenticated".to_string(),
        (SessionState::Anonymous, Some(_)) => "session: expired, log in again".to_string(),
        (SessionState::Anonymous, None) => return "session: anonymous".to_string(),
    };

    match &status.user_id {
        Some(user) => format!("{session}\nuser: {user}"),
        None => session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let live = SessionStatus {
            state: SessionState::Authenticated,
            user_id: None,
            issued_at: None,
            expires_at: Some(1_700_000_090),
            remaining_secs: Some(90),
        };
        assert_eq!(describe(&live), "session: authenticated, expires in 90s");

        let named = SessionStatus {
            user_id: Some("7".to_string()),
            issued_at: Some(1_700_000_000),
            ..live
        };
        assert_eq!(
            describe(&named),
            "session: authenticated, expires in 90s\nuser: 7"
        );

        let expired = SessionStatus {
            state: SessionState::Anonymous,
            user_id: Some("7".to_string()),
            issued_at: None,
            expires_at: Some(1_700_000_000),
            remaining_secs: Some(0),
        };
        assert_eq!(describe(&expired), "session: expired, log in again\nuser: 7");

        let none = SessionStatus {
            state: SessionState::Anonymous,
            user_id: None,
            issued_at: None,
            expires_at: None,
            remaining_secs: None,
        };
        assert_eq!(describe(&none), "session: anonymous");
    }
}

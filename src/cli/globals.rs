//! Settings shared by every subcommand.

use crate::session::{AuthClient, FileTokenStore, RoutePolicy, SessionGuard};
use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub token_file: PathBuf,
    pub policy: RoutePolicy,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, token_file: PathBuf, policy: RoutePolicy) -> Self {
        Self {
            api_url,
            token_file,
            policy,
        }
    }

    /// Assemble the guard backed by the session file.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is unusable.
    pub fn session_guard(&self) -> Result<SessionGuard<FileTokenStore>> {
        let client = AuthClient::new(&self.api_url)?;
        let store = FileTokenStore::new(&self.token_file);
        Ok(SessionGuard::new(store, self.policy.clone(), client))
    }
}

/// `$XDG_CONFIG_HOME/sb-admin/session.json`, falling back to `$HOME/.config`
/// and finally the working directory.
#[must_use]
pub fn default_token_file() -> PathBuf {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|value| !value.is_empty())
                .map(|home| Path::new(&home).join(".config"))
        });

    match config_home {
        Some(dir) => dir.join("sb-admin").join("session.json"),
        None => PathBuf::from(".sb-admin-session.json"),
    }
}

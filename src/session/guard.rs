//! The single authority on whether the current visitor may stay on a page.
//!
//! State is never cached: every call reads the store and the clock afresh, so
//! an access token that expires between two checks is noticed on the second.

use super::{
    client::{AuthClient, Credentials},
    error::AuthError,
    routes::{RouteClass, RoutePolicy},
    store::TokenStore,
    token::{decode_claims, is_unexpired, unix_now, AccessClaims, TokenPair},
};
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    Stay,
    Redirect(String),
}

/// Snapshot of the stored session, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub user_id: Option<String>,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub remaining_secs: Option<i64>,
}

pub struct SessionGuard<S> {
    store: S,
    policy: RoutePolicy,
    client: AuthClient,
}

impl<S: TokenStore> SessionGuard<S> {
    #[must_use]
    pub fn new(store: S, policy: RoutePolicy, client: AuthClient) -> Self {
        Self {
            store,
            policy,
            client,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exchange credentials for a token pair and persist it.
    ///
    /// # Errors
    ///
    /// Returns the endpoint's rejection or transport error unchanged, leaving the
    /// store untouched. Returns `AuthError::StorageUnavailable` if the pair was
    /// issued but could not be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        let pair = self.client.obtain_token_pair(credentials).await?;

        if let Err(err) = self.store.write(&pair) {
            warn!("token pair issued but not persisted: {err}");
            return Err(AuthError::StorageUnavailable(err));
        }

        info!("session established");

        Ok(pair)
    }

    /// Clear the stored pair. Nothing is revoked server-side.
    ///
    /// Returns `false` if the store could not be cleared; the failure is logged
    /// rather than surfaced.
    pub fn logout(&self) -> bool {
        match self.store.clear() {
            Ok(()) => {
                info!("session cleared");
                true
            }
            Err(err) => {
                warn!("failed to clear session: {err}");
                false
            }
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(unix_now())
    }

    #[must_use]
    pub fn is_authenticated_at(&self, now: i64) -> bool {
        self.store
            .read()
            .is_some_and(|pair| is_unexpired(pair.access().expose_secret(), now))
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state_at(unix_now())
    }

    #[must_use]
    pub fn session_state_at(&self, now: i64) -> SessionState {
        if self.is_authenticated_at(now) {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    #[must_use]
    pub fn guard(&self, path: &str) -> RedirectDecision {
        self.guard_at(path, unix_now())
    }

    /// Decide where a visitor on `path` belongs at time `now`.
    ///
    /// | route     | session       | decision             |
    /// |-----------|---------------|----------------------|
    /// | public    | authenticated | redirect to landing  |
    /// | public    | anonymous     | stay                 |
    /// | protected | authenticated | stay                 |
    /// | protected | anonymous     | redirect to login    |
    #[must_use]
    pub fn guard_at(&self, path: &str, now: i64) -> RedirectDecision {
        let class = self.policy.classify(path);
        let state = self.session_state_at(now);

        let decision = decide(&self.policy, class, state);
        debug!(?class, ?state, ?decision, "guard evaluated");

        decision
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status_at(unix_now())
    }

    #[must_use]
    pub fn status_at(&self, now: i64) -> SessionStatus {
        let claims = self
            .store
            .read()
            .and_then(|pair| decode_claims(pair.access().expose_secret()).ok());
        let expires_at = claims.as_ref().map(|claims| claims.exp);

        let state = match expires_at {
            Some(exp) if exp > now => SessionState::Authenticated,
            _ => SessionState::Anonymous,
        };

        // `exp` is server-controlled and may sit anywhere in the i64 range.
        SessionStatus {
            state,
            user_id: claims.as_ref().and_then(AccessClaims::user),
            issued_at: claims.as_ref().and_then(|claims| claims.iat),
            expires_at,
            remaining_secs: expires_at.map(|exp| exp.saturating_sub(now).max(0)),
        }
    }
}

fn decide(policy: &RoutePolicy, class: RouteClass, state: SessionState) -> RedirectDecision {
    match (class, state) {
        (RouteClass::Public, SessionState::Authenticated) => {
            RedirectDecision::Redirect(policy.landing_path().to_string())
        }
        (RouteClass::Protected, SessionState::Anonymous) => {
            RedirectDecision::Redirect(policy.login_path().to_string())
        }
        (RouteClass::Public, SessionState::Anonymous)
        | (RouteClass::Protected, SessionState::Authenticated) => RedirectDecision::Stay,
    }
}

//! Runs the guard on every navigation, in order.
//!
//! A navigation waits for the token store to report ready, then evaluates the
//! guard and, if needed, tells the router to move. Only the latest navigation
//! may act: one that was overtaken while waiting is reported as superseded and
//! issues no router command.

use super::{
    guard::{RedirectDecision, SessionGuard},
    store::TokenStore,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::debug;

/// Explicit "storage is initialised" signal, replacing a fixed settle delay.
#[derive(Debug, Clone)]
pub struct StorageReadiness {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for StorageReadiness {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageReadiness {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that is already raised, for backings that need no warm-up.
    #[must_use]
    pub fn ready() -> Self {
        let readiness = Self::new();
        readiness.mark_ready();
        readiness
    }

    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only resolves once ready.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

/// Performs client-side navigation.
pub trait Router: Send + Sync {
    fn replace(&self, path: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page may initialise and fetch its data.
    Render,
    /// The router was sent elsewhere; the page must render nothing.
    Redirected(String),
    /// A newer navigation arrived first; this one did nothing.
    Superseded,
}

impl NavigationOutcome {
    #[must_use]
    pub fn may_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

pub struct Navigator<S, R> {
    guard: Arc<SessionGuard<S>>,
    router: R,
    readiness: StorageReadiness,
    latest: Mutex<u64>,
}

impl<S: TokenStore, R: Router> Navigator<S, R> {
    #[must_use]
    pub fn new(guard: Arc<SessionGuard<S>>, router: R, readiness: StorageReadiness) -> Self {
        Self {
            guard,
            router,
            readiness,
            latest: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn guard(&self) -> &SessionGuard<S> {
        &self.guard
    }

    pub async fn on_path_change(&self, path: &str) -> NavigationOutcome {
        let ticket = {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            *latest += 1;
            *latest
        };

        self.readiness.wait().await;

        // Held until the router has been told, so a newer navigation cannot
        // slip in between the staleness check and the redirect.
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if *latest != ticket {
            debug!(ticket, latest = *latest, "navigation to {path} superseded");
            return NavigationOutcome::Superseded;
        }

        match self.guard.guard(path) {
            RedirectDecision::Stay => NavigationOutcome::Render,
            RedirectDecision::Redirect(target) => {
                self.router.replace(&target);
                NavigationOutcome::Redirected(target)
            }
        }
    }
}

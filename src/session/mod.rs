//! Client-side session lifecycle for the admin console.
//!
//! A successful login stores an access/refresh pair; every later check decodes
//! the access token's `exp` claim and compares it against the clock. Routes are
//! classified as public or protected from a static allow-list, and the guard
//! combines both into a redirect decision. This is a UX gate only: the API
//! checks every request on its own, and tokens are never logged.
//!
//! There is no refresh flow. Once the access token expires the visitor is sent
//! back to the login page.

pub mod client;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod routes;
pub mod store;
pub mod token;

pub use client::{AuthClient, Credentials};
pub use error::{AuthError, StoreError};
pub use guard::{RedirectDecision, SessionGuard, SessionState, SessionStatus};
pub use navigation::{NavigationOutcome, Navigator, Router, StorageReadiness};
pub use routes::{RouteClass, RoutePolicy};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{AccessClaims, TokenDecodeError, TokenPair};

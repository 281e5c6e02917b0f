//! Session guard for the SB admin console.
//!
//! The [`session`] module owns the access/refresh token lifecycle, classifies
//! console routes as public or protected, and decides where a visitor should be
//! redirected. The [`cli`] module wires it to a command-line front end where a
//! token file plays the role of the browser's persistent store.

pub mod cli;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

//! Client for the console's token endpoint. Credentials and tokens pass through
//! here, so nothing in this module logs request or response bodies.

use super::{error::AuthError, token::TokenPair};
use crate::APP_USER_AGENT;
use regex::Regex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info_span, instrument, Instrument};
use url::Url;

pub const LOGIN_ENDPOINT: &str = "/api/token/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;
const DEFAULT_REJECTION: &str = "Invalid credentials";
/// Error bodies are read up to this many bytes; the rest is discarded unread.
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password,
        }
    }

    /// Checks the form before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` for an empty or malformed email or an empty password.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.is_empty() || self.password.expose_secret().trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "Email and password are required.".to_string(),
            ));
        }
        if !valid_email(&self.email) {
            return Err(AuthError::InvalidInput(
                "Enter a valid email address.".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
    refresh: String,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    login_url: Url,
}

impl AuthClient {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL or the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let login_url = endpoint_url(base_url, LOGIN_ENDPOINT)?;

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, login_url })
    }

    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Exchange credentials for an access/refresh pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` when the endpoint answers with a non-2xx status,
    /// `Timeout`/`Network` on transport failures and `InvalidResponse` when a 2xx body
    /// does not carry both tokens.
    #[instrument(skip_all)]
    pub async fn obtain_token_pair(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        credentials.validate()?;

        let payload = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });

        let span = info_span!(
            "auth.obtain_token_pair",
            http.method = "POST",
            url = %self.login_url
        );
        let response = self
            .http
            .post(self.login_url.clone())
            .json(&payload)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            debug!("token endpoint answered {status}");
            return Err(rejection(status.as_u16(), &body));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))?;

        let pair = TokenPair::new(tokens.access, tokens.refresh);
        if !pair.is_complete() {
            return Err(AuthError::InvalidResponse(
                "token pair is incomplete".to_string(),
            ));
        }

        Ok(pair)
    }
}

/// Joins `path` onto an http(s) base URL, keeping any path prefix the base carries.
fn endpoint_url(base_url: &str, path: &str) -> Result<Url, AuthError> {
    let base = Url::parse(base_url.trim())
        .map_err(|err| AuthError::Config(format!("{base_url:?}: {err}")))?;

    match base.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AuthError::Config(format!(
                "unsupported scheme {scheme} in {base_url:?}"
            )))
        }
    }
    if base.host().is_none() {
        return Err(AuthError::Config(format!("no host in {base_url:?}")));
    }

    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    Url::parse(&joined).map_err(|err| AuthError::Config(format!("{joined:?}: {err}")))
}

fn map_request_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::Timeout
    } else {
        AuthError::Network(err.to_string())
    }
}

async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while body.len() < MAX_ERROR_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(err) => {
                debug!("failed to read error body: {err}");
                break;
            }
        }
    }
    body.truncate(MAX_ERROR_BODY_BYTES);

    String::from_utf8_lossy(&body).into_owned()
}

fn rejection(status: u16, body: &str) -> AuthError {
    let (message, code) = match serde_json::from_str::<Value>(body) {
        Ok(payload) => {
            let message = payload
                .get("detail")
                .and_then(Value::as_str)
                .or_else(|| payload.get("message").and_then(Value::as_str))
                .unwrap_or(DEFAULT_REJECTION)
                .to_string();
            let code = payload
                .get("code")
                .and_then(Value::as_str)
                .map(ToString::to_string);
            (message, code)
        }
        Err(_) if !body.trim().is_empty() => (body.trim().to_string(), None),
        Err(_) => (DEFAULT_REJECTION.to_string(), None),
    };

    AuthError::Rejected {
        status,
        message: message.chars().take(MAX_ERROR_CHARS).collect(),
        code,
    }
}

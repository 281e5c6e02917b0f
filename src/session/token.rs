//! Access/refresh token pair and client-side claim decoding.
//!
//! Claims are read without verifying the signature: the result only drives
//! route gating in the console, the API remains the authority on every request.

use base64ct::{Base64UrlUnpadded, Encoding};
use secrecy::{ExposeSecret, SecretString};
use serde::{de, Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("invalid token format")]
    Format,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid claims json")]
    Json(#[from] serde_json::Error),
}

/// Access and refresh token as returned by the authentication endpoint.
#[derive(Clone)]
pub struct TokenPair {
    access: SecretString,
    refresh: SecretString,
}

impl TokenPair {
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: SecretString::from(refresh.into()),
        }
    }

    #[must_use]
    pub fn access(&self) -> &SecretString {
        &self.access
    }

    #[must_use]
    pub fn refresh(&self) -> &SecretString {
        &self.refresh
    }

    /// Both halves carry a value. A pair missing either one is treated as no pair at all.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access.expose_secret().trim().is_empty()
            && !self.refresh.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"***")
            .field("refresh", &"***")
            .finish()
    }
}

/// Claims the console cares about. Anything else in the payload is ignored.
///
/// `exp` and `iat` are NumericDates and may carry a fractional part, which is
/// floored to whole seconds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccessClaims {
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
    #[serde(default, deserialize_with = "optional_numeric_date")]
    pub iat: Option<i64>,
    #[serde(default)]
    pub user_id: Option<Value>,
}

impl AccessClaims {
    /// The signed-in user's id as text, whether the issuer sent a number or a string.
    #[must_use]
    pub fn user(&self) -> Option<String> {
        match self.user_id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Number::deserialize(deserializer)?;
    whole_seconds(&value).ok_or_else(|| de::Error::custom(format!("invalid NumericDate {value}")))
}

fn optional_numeric_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<Number>::deserialize(deserializer)?
        .map(|value| {
            whole_seconds(&value)
                .ok_or_else(|| de::Error::custom(format!("invalid NumericDate {value}")))
        })
        .transpose()
}

#[allow(clippy::cast_possible_truncation)]
fn whole_seconds(value: &Number) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|secs| secs.is_finite())
            .map(|secs| secs.floor() as i64)
    })
}

/// Decode the payload segment of a JWT-structured token.
///
/// # Errors
///
/// Returns an error if the token does not have exactly three segments, if the
/// payload is not base64url, or if it is not a JSON object with a numeric `exp`.
pub fn decode_claims(token: &str) -> Result<AccessClaims, TokenDecodeError> {
    let mut parts = token.trim().split('.');
    let _header = parts.next().ok_or(TokenDecodeError::Format)?;
    let claims_b64 = parts.next().ok_or(TokenDecodeError::Format)?;
    let _signature = parts.next().ok_or(TokenDecodeError::Format)?;
    if parts.next().is_some() || claims_b64.is_empty() {
        return Err(TokenDecodeError::Format);
    }

    let bytes = Base64UrlUnpadded::decode_vec(claims_b64.trim_end_matches('='))
        .map_err(|_| TokenDecodeError::Base64)?;

    Ok(serde_json::from_slice(&bytes)?)
}

/// True iff the token decodes and its `exp` is strictly after `now`.
#[must_use]
pub fn is_unexpired(token: &str, now: i64) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp > now,
        Err(err) => {
            debug!("access token rejected: {err}");
            false
        }
    }
}

/// Current wall-clock time in epoch seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

//! Registry token exchange and freshness
//!
//! The token service answers a `GET` with JSON along the lines of:
//!
//! ```json
//! {"token": "...", "access_token": "...", "expires_in": 300, "issued_at": "2020-11-10T12:00:00.123Z"}
//! ```
//!
//! `expires_in` is a delta in seconds from `issued_at`, which is stamped by
//! the issuer's clock, not ours.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::clock::Clock;
use crate::credentials::BasicCredentials;
use crate::error::{Error, Result};

/// Raw token service response.
///
/// Docker Hub sends the same value under both `token` and `access_token`;
/// other registries send only one of them.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Seconds the token is valid for, counted from `issued_at`
    pub expires_in: i64,
    pub issued_at: DateTime<Utc>,
}

/// A bearer token together with its validity window.
///
/// Never modified after construction; a refresh replaces the whole value.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    token: String,
    issued_at: DateTime<Utc>,
    expires_in: i64,
}

impl AuthToken {
    pub fn new(token: impl Into<String>, issued_at: DateTime<Utc>, expires_in: i64) -> Self {
        Self {
            token: token.into(),
            issued_at,
            expires_in,
        }
    }

    /// The bearer value for the Authorization header
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }

    /// Instant after which the token is no longer used.
    ///
    /// `issued_at + expires_in - buffer`. Returns `None` when the arithmetic
    /// leaves chrono's representable range, which callers treat as unusable.
    pub fn rough_expiry(&self, buffer: Duration) -> Option<DateTime<Utc>> {
        let validity = TimeDelta::try_seconds(self.expires_in)?;
        let buffer = TimeDelta::from_std(buffer).ok()?;
        self.issued_at
            .checked_add_signed(validity.checked_sub(&buffer)?)
    }

    /// Whether the token may still be presented at `clock.now()`.
    ///
    /// Strictly before the rough expiry. A token whose `expires_in` does not
    /// exceed the buffer is unusable from the moment it is issued.
    pub fn is_usable(&self, clock: &dyn Clock, buffer: Duration) -> bool {
        self.rough_expiry(buffer)
            .is_some_and(|expiry| clock.now() < expiry)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl TryFrom<TokenResponse> for AuthToken {
    type Error = Error;

    fn try_from(response: TokenResponse) -> Result<Self> {
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .or(response.access_token.filter(|t| !t.is_empty()))
            .ok_or_else(|| Error::Decode("response carries neither token nor access_token".into()))?;

        Ok(Self {
            token,
            issued_at: response.issued_at,
            expires_in: response.expires_in,
        })
    }
}

/// Decode a token service body into an `AuthToken`.
///
/// A JSON object that lacks the expected fields is as much a failure as a
/// body that is not JSON at all.
pub fn parse_token_response(body: &[u8]) -> Result<AuthToken> {
    let response: TokenResponse =
        serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))?;
    AuthToken::try_from(response)
}

/// Request a fresh token from the token service.
///
/// Sends Basic auth when `credentials` is present, otherwise asks for an
/// anonymous token. Any non-2xx status is an error.
pub async fn fetch_token(
    client: &reqwest::Client,
    auth_url: &str,
    credentials: Option<&BasicCredentials>,
) -> Result<AuthToken> {
    let mut request = client.get(auth_url);
    if let Some(credentials) = credentials {
        request = request.basic_auth(credentials.username(), Some(credentials.passphrase()));
    }

    let response = request
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Http(format!("reading token response: {e}")))?;

    let token = parse_token_response(&body)?;
    debug!(
        issued_at = %token.issued_at,
        expires_in = token.expires_in,
        authenticated = credentials.is_some(),
        "token exchange succeeded"
    );
    Ok(token)
}

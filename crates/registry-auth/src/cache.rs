//! In-memory cache holding at most one registry token
//!
//! The cache is consulted on every scrape and refreshes lazily: a token is
//! only requested when none is held or the held one has left its usable
//! window. Nothing is persisted; a restart begins with an empty cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::constants::TOKEN_EXPIRY_BUFFER;
use crate::credentials::BasicCredentials;
use crate::error::Result;
use crate::token::{AuthToken, fetch_token};

/// Lazily refreshed single-token cache.
///
/// Not internally synchronized; the owner serializes access (the scrape
/// engine holds it behind its own lock).
pub struct TokenCache {
    auth_url: String,
    credentials: Option<BasicCredentials>,
    clock: Arc<dyn Clock>,
    buffer: Duration,
    token: Option<AuthToken>,
}

impl TokenCache {
    /// Empty cache against `auth_url`, using the wall clock and the default
    /// expiry buffer.
    pub fn new(auth_url: impl Into<String>, credentials: Option<BasicCredentials>) -> Self {
        Self {
            auth_url: auth_url.into(),
            credentials,
            clock: Arc::new(SystemClock),
            buffer: TOKEN_EXPIRY_BUFFER,
            token: None,
        }
    }

    /// Replace the time source used for freshness checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the safety margin subtracted from each token's validity.
    pub fn with_buffer(mut self, buffer: Duration) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// The held token, usable or not.
    pub fn current(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn has_usable_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| token.is_usable(self.clock.as_ref(), self.buffer))
    }

    /// Drop the held token so the next lookup performs an exchange.
    pub fn invalidate(&mut self) {
        if self.token.take().is_some() {
            debug!("cached registry token invalidated");
        }
    }

    /// Return a token that is usable right now, exchanging for a new one if
    /// needed.
    ///
    /// On a failed exchange the error is returned and the cache keeps
    /// whatever it held before the attempt.
    pub async fn usable_token(&mut self, client: &reqwest::Client) -> Result<String> {
        if let Some(token) = self
            .token
            .as_ref()
            .filter(|token| token.is_usable(self.clock.as_ref(), self.buffer))
        {
            return Ok(token.token().to_owned());
        }

        debug!(
            cached = self.token.is_some(),
            authenticated = self.credentials.is_some(),
            "no usable registry token, requesting a new one"
        );
        let token = fetch_token(client, &self.auth_url, self.credentials.as_ref()).await?;
        info!(
            issued_at = %token.issued_at(),
            expires_in = token.expires_in(),
            "obtained registry token"
        );

        let value = token.token().to_owned();
        self.token = Some(token);
        Ok(value)
    }
}

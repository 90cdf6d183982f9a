//! Docker registry bearer token handling
//!
//! Obtains short-lived bearer tokens from the registry's token service and
//! caches the most recent one in memory. The cache judges token freshness
//! against an injectable clock so expiry behaviour can be tested without
//! waiting on the wall clock.
//!
//! Token flow:
//! 1. Caller asks `TokenCache::usable_token()` for a token
//! 2. Cached token still inside its usable window → returned as-is
//! 3. Otherwise `token::fetch_token()` exchanges (optionally Basic-authenticated)
//! 4. The new token replaces the cached one; a failed exchange leaves it alone

pub mod cache;
pub mod clock;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod token;

pub use cache::TokenCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::*;
pub use credentials::BasicCredentials;
pub use error::{Error, Result};
pub use token::{AuthToken, TokenResponse, fetch_token, parse_token_response};

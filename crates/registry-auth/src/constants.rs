//! Docker Hub endpoint defaults
//!
//! `ratelimitpreview/test` is the repository Docker publishes for checking
//! pull quota. A `HEAD` on its manifest reports the limit headers without
//! counting as a pull.

use std::time::Duration;

/// Token service URL scoped for a pull of the rate-limit preview repository
pub const DEFAULT_AUTH_URL: &str =
    "https://auth.docker.io/token?service=registry.docker.io&scope=repository:ratelimitpreview/test:pull";

/// Manifest URL that answers with `RateLimit-*` headers
pub const DEFAULT_RATE_LIMIT_URL: &str =
    "https://registry-1.docker.io/v2/ratelimitpreview/test/manifests/latest";

/// Tolerated clock drift between this host and the token issuer, in seconds.
///
/// A token is treated as expired this long before its nominal expiry so it
/// is never presented right at the edge of its validity.
pub const TOKEN_EXPIRY_BUFFER_SECS: u64 = 2;

/// `TOKEN_EXPIRY_BUFFER_SECS` as a `Duration`
pub const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(TOKEN_EXPIRY_BUFFER_SECS);

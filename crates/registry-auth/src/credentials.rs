//! Optional Basic-auth credentials for the token service
//!
//! Anonymous tokens carry the anonymous pull quota; authenticating with a
//! Docker Hub account reports that account's quota instead.

use std::fmt;

use zeroize::Zeroize;

/// Username and passphrase sent as HTTP Basic auth on token requests.
///
/// The passphrase is redacted in `Debug` output and wiped on drop.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    passphrase: String,
}

impl BasicCredentials {
    /// Build credentials, or `None` unless both parts are non-empty.
    ///
    /// A username without a passphrase (or the reverse) means anonymous
    /// access rather than a half-configured login.
    pub fn new(username: impl Into<String>, passphrase: impl Into<String>) -> Option<Self> {
        let username = username.into();
        let mut passphrase = passphrase.into();
        if username.is_empty() || passphrase.is_empty() {
            passphrase.zeroize();
            return None;
        }
        Some(Self {
            username,
            passphrase,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Expose the passphrase (only for building the Authorization header)
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

impl Drop for BasicCredentials {
    fn drop(&mut self) {
        self.passphrase.zeroize();
    }
}

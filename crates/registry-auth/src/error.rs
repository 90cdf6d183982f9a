//! Error types for token exchange

/// Errors from a token exchange.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection refused, timeout, malformed URL
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token endpoint returned HTTP status {0}")]
    Status(u16),

    /// Body is not JSON or lacks a required field
    #[error("invalid token response: {0}")]
    Decode(String),
}

impl Error {
    /// Short classification used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Http(_) => "transport",
            Error::Status(_) => "status",
            Error::Decode(_) => "decode",
        }
    }
}

/// Result alias for token operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for a single scrape
//!
//! None of these reach the metrics publisher: `Exporter::scrape` logs them,
//! counts a failure and keeps the previous observation.

/// Errors from one scrape attempt.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("token exchange failed: {0}")]
    Auth(#[from] registry_auth::Error),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("rate limit endpoint returned HTTP status {0}")]
    Status(u16),

    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("invalid {header} header {value:?}: {reason}")]
    InvalidHeader {
        header: &'static str,
        value: String,
        reason: String,
    },
}

impl Error {
    /// Short classification used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Auth(registry_auth::Error::Http(_)) => "auth_transport",
            Error::Auth(registry_auth::Error::Status(_)) => "auth_status",
            Error::Auth(registry_auth::Error::Decode(_)) => "auth_decode",
            Error::Http(_) => "transport",
            Error::Status(_) => "status",
            Error::MissingHeader(_) => "missing_header",
            Error::InvalidHeader { .. } => "parse",
        }
    }
}

/// Result alias for scrape operations.
pub type Result<T> = std::result::Result<T, Error>;

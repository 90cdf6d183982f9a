//! Service startup error types

use thiserror::Error;

/// Errors raised while assembling the runtime configuration.
///
/// Scrape failures never surface here; they are counted by the exporter.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid arguments: {0}")]
    Usage(String),
}

/// Result alias using service Error
pub type Result<T> = std::result::Result<T, Error>;

//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The registry passphrase comes from DOCKERHUB_PASSPHRASE, `--pass` or
//! `passphrase_file`, never from the TOML directly.

use registry_auth::{BasicCredentials, DEFAULT_AUTH_URL, DEFAULT_RATE_LIMIT_URL, TOKEN_EXPIRY_BUFFER_SECS};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "dockerhub-exporter.toml";

/// Served by the listener itself; not available as a metrics path
pub const HEALTH_PATH: &str = "/health";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub metrics_path: String,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            metrics_path: "/metrics".into(),
            max_connections: 64,
        }
    }
}

/// Registry endpoints and credentials
#[derive(Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub auth_url: String,
    pub rate_limit_url: String,
    pub timeout_secs: u64,
    pub token_expiry_buffer_secs: u64,
    pub username: Option<String>,
    /// Path to a file holding the passphrase (alternative to DOCKERHUB_PASSPHRASE)
    pub passphrase_file: Option<PathBuf>,
    #[serde(skip)]
    pub passphrase: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.into(),
            rate_limit_url: DEFAULT_RATE_LIMIT_URL.into(),
            timeout_secs: 5,
            token_expiry_buffer_secs: TOKEN_EXPIRY_BUFFER_SECS,
            username: None,
            passphrase_file: None,
            passphrase: None,
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("auth_url", &self.auth_url)
            .field("rate_limit_url", &self.rate_limit_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("token_expiry_buffer_secs", &self.token_expiry_buffer_secs)
            .field("username", &self.username)
            .field("passphrase_file", &self.passphrase_file)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token_expiry_buffer(&self) -> Duration {
        Duration::from_secs(self.token_expiry_buffer_secs)
    }

    /// Basic-auth credentials, present only when both parts are non-empty.
    pub fn credentials(&self) -> Option<BasicCredentials> {
        BasicCredentials::new(
            self.username.clone().unwrap_or_default(),
            self.passphrase.clone().unwrap_or_default(),
        )
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Passphrase resolution order:
    /// 1. DOCKERHUB_PASSPHRASE env var
    /// 2. passphrase_file path from config
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::from_toml(""),
            Err(e) => Err(e.into()),
        }
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;

        if let Ok(username) = std::env::var("DOCKERHUB_USERNAME") {
            config.registry.username = Some(username);
        }

        if let Ok(passphrase) = std::env::var("DOCKERHUB_PASSPHRASE") {
            config.registry.passphrase = Some(passphrase);
        } else if let Some(ref file) = config.registry.passphrase_file {
            let passphrase = std::fs::read_to_string(file).map_err(|e| {
                Error::Config(format!(
                    "failed to read passphrase_file {}: {e}",
                    file.display()
                ))
            })?;
            let passphrase = passphrase.trim().to_owned();
            if !passphrase.is_empty() {
                config.registry.passphrase = Some(passphrase);
            }
        }

        Ok(config)
    }

    /// Overlay command-line flags, which win over everything else.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.server.listen_addr.set_port(port);
        }
        if let Some(ref path) = cli.path {
            self.server.metrics_path = path.clone();
        }
        if let Some(ref user) = cli.user {
            self.registry.username = Some(user.clone());
        }
        if let Some(ref pass) = cli.pass {
            self.registry.passphrase = Some(pass.clone());
        }
    }

    /// Check the merged configuration before anything is started.
    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("auth_url", &self.registry.auth_url),
            ("rate_limit_url", &self.registry.rate_limit_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "{field} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if self.registry.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }

        let path = &self.server.metrics_path;
        if !path.starts_with('/') || path == "/" || path == HEALTH_PATH {
            return Err(Error::Config(format!(
                "metrics_path must start with / and must not be / or {HEALTH_PATH}, got: {path:?}"
            )));
        }

        if self.server.max_connections == 0 {
            return Err(Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Resolve an explicitly requested config path from CLI arg or
    /// CONFIG_PATH env var. `None` means the default path, which may be
    /// absent.
    pub fn resolve_path(cli_path: Option<&str>) -> Option<PathBuf> {
        if let Some(p) = cli_path {
            return Some(PathBuf::from(p));
        }
        std::env::var("CONFIG_PATH").ok().map(PathBuf::from)
    }
}

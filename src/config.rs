//! Connection settings for a hub, from code or the environment.

use std::time::Duration;

use serde::Deserialize;

use crate::client::WiserHubBuilder;
use crate::transport::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_RETRIES, TransportConfig,
};
use crate::{Error, Result};

pub const ENV_HOST: &str = "WISER_HUB_HOST";
pub const ENV_SECRET: &str = "WISER_HUB_SECRET";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "WISER_CONNECT_TIMEOUT_MS";
pub const ENV_READ_TIMEOUT_MS: &str = "WISER_READ_TIMEOUT_MS";
pub const ENV_RETRIES: &str = "WISER_RETRIES";

#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Hub address, `ip` or `ip:port`.
    pub host: String,
    pub secret: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT.as_millis() as u64
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

impl HubConfig {
    pub fn new(host: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            secret: secret.into(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            retries: default_retries(),
        }
    }

    /// Reads `WISER_HUB_HOST` and `WISER_HUB_SECRET` (required) plus the
    /// optional timeout and retry overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| match lookup(key) {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(Error::Config(format!("{key} environment variable not set"))),
        };
        let mut config = Self::new(required(ENV_HOST)?, required(ENV_SECRET)?);

        if let Some(ms) = parse_opt::<u64>(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            config.connect_timeout_ms = ms;
        }
        if let Some(ms) = parse_opt::<u64>(&lookup, ENV_READ_TIMEOUT_MS)? {
            config.read_timeout_ms = ms;
        }
        if let Some(n) = parse_opt::<u32>(&lookup, ENV_RETRIES)? {
            config.retries = n;
        }
        Ok(config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn builder(&self) -> WiserHubBuilder {
        WiserHubBuilder::new(&self.host, &self.secret).transport(TransportConfig {
            connect_timeout: self.connect_timeout(),
            read_timeout: self.read_timeout(),
            retries: self.retries,
        })
    }
}

fn parse_opt<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got '{v}'"))),
        _ => Ok(None),
    }
}

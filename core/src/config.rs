//! Credentials and protocol version for the BlockScore API.
//!
//! # Design
//! A `Config` is owned by each `Client`, so two clients in the same process
//! can talk to the service with different keys or versions. Nothing here is
//! validated eagerly: a blank key or a zero version is reported by the
//! executor as `Error::Configuration` before any request leaves the process.

use std::env;

use crate::error::Error;

/// Origin every request path is rooted at.
pub const API_URL: &str = "https://api.blockscore.com";

/// Newest protocol revision this client understands.
pub const DEFAULT_VERSION: u32 = 4;

pub const API_KEY_ENV: &str = "BLOCKSCORE_API_KEY";
pub const API_VERSION_ENV: &str = "BLOCKSCORE_API_VERSION";
pub const API_URL_ENV: &str = "BLOCKSCORE_API_URL";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub(crate) api_key: String,
    pub(crate) version: u32,
    pub(crate) base_url: String,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            version: DEFAULT_VERSION,
            base_url: API_URL.to_string(),
        }
    }

    /// Load the key from `BLOCKSCORE_API_KEY`, with optional version and
    /// origin overrides from `BLOCKSCORE_API_VERSION` / `BLOCKSCORE_API_URL`.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = env::var(API_KEY_ENV).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "{API_KEY_ENV} not found in environment"
            )));
        }

        let mut config = Self::new(api_key);
        if let Ok(raw) = env::var(API_VERSION_ENV) {
            let version = raw.trim().parse::<u32>().map_err(|e| {
                Error::Configuration(format!("invalid {API_VERSION_ENV} {raw:?}: {e}"))
            })?;
            config = config.with_version(version);
        }
        if let Ok(url) = env::var(API_URL_ENV) {
            config = config.with_base_url(url);
        }
        Ok(config)
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value of the `Accept` header selecting the configured protocol revision.
    pub fn accept_header(&self) -> String {
        format!("application/vnd.blockscore+json;version={}", self.version)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.api_key.is_empty() {
            return Err(Error::Configuration("BlockScore API key is not set".to_string()));
        }
        if self.version == 0 {
            return Err(Error::Configuration(
                "BlockScore API version must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("version", &self.version)
            .field("base_url", &self.base_url)
            .finish()
    }
}

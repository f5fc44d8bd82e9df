//! Client configuration and the options provider that supplies it.
//!
//! Sources are merged in order, later ones overriding earlier ones:
//! built-in defaults, an optional TOML file, then `HTTP_CLIENT_*`
//! environment variables (e.g. `HTTP_CLIENT_BASE_ADDRESS`).

use std::path::Path;
use std::sync::Arc;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const ENV_PREFIX: &str = "HTTP_CLIENT_";

/// Immutable settings shared by every client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Prefix prepended verbatim to every request path.
    pub base_address: String,
    /// MIME type used for `Accept` and `Content-Type`.
    pub application: String,
    /// Name of the cache-control style header.
    pub cache: String,
    /// Value sent in the `cache` header.
    pub no_cache: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_address: String::new(),
            application: "application/json".to_string(),
            cache: "Cache-Control".to_string(),
            no_cache: "no-cache".to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn new(base_address: impl Into<String>) -> Self {
        Self {
            base_address: base_address.into(),
            ..Default::default()
        }
    }

    /// Load from defaults, an optional TOML file and the environment.
    ///
    /// A `path` that does not exist is skipped rather than treated as an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if path.exists() {
                debug!(path = %path.display(), "loading http client config file");
                figment = figment.merge(Toml::file(path));
            } else {
                debug!(path = %path.display(), "http client config file not found, skipping");
            }
        }

        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configured header name and values are sendable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        HeaderName::from_bytes(self.cache.as_bytes())
            .map_err(|_| ConfigError::Invalid(format!("cache header name {:?}", self.cache)))?;
        for (field, value) in [("no_cache", &self.no_cache), ("application", &self.application)] {
            if value.is_empty() || HeaderValue::from_str(value).is_err() {
                return Err(ConfigError::Invalid(format!("{field} value {value:?}")));
            }
        }
        Ok(())
    }
}

/// Supplies the configuration at construction time.
///
/// The client takes one snapshot when it is built and never asks again.
pub trait OptionsProvider {
    fn options(&self) -> Arc<HttpClientConfig>;
}

impl OptionsProvider for Arc<HttpClientConfig> {
    fn options(&self) -> Arc<HttpClientConfig> {
        Arc::clone(self)
    }
}

impl OptionsProvider for HttpClientConfig {
    fn options(&self) -> Arc<HttpClientConfig> {
        Arc::new(self.clone())
    }
}

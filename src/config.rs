use crate::error::{RaveError, RaveResult};
use crate::payments::endpoints::Environment;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const ENV_PREFIX: &str = "RAVE";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Gateway client configuration
///
/// Loaded from `RAVE_*` environment variables by [`RaveConfig::from_env`]:
/// `RAVE_PUBLIC_KEY`, `RAVE_SECRET_KEY`, `RAVE_PRODUCTION`, `RAVE_BASE_URL`,
/// `RAVE_TIMEOUT_SECS`, `RAVE_REFERENCE_PREFIX`.
#[derive(Clone, Deserialize)]
pub struct RaveConfig {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub secret_key: String,
    /// Use the production host instead of the sandbox
    #[serde(default)]
    pub production: bool,
    /// Overrides the sandbox/production host (proxies, mock gateways)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Prefix for generated transaction references (defaults to `MC`)
    #[serde(default)]
    pub reference_prefix: Option<String>,
}

impl Default for RaveConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            secret_key: String::new(),
            production: false,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            reference_prefix: None,
        }
    }
}

impl fmt::Debug for RaveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaveConfig")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .field("production", &self.production)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("reference_prefix", &self.reference_prefix)
            .finish()
    }
}

impl RaveConfig {
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> RaveResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| RaveError::configuration(format!("Failed to read environment: {}", e)))?;

        let config: RaveConfig = settings
            .try_deserialize()
            .map_err(|e| RaveError::configuration(format!("Invalid RAVE_* settings: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn environment(&self) -> Environment {
        if self.production {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> RaveResult<()> {
        if self.public_key.trim().is_empty() {
            return Err(RaveError::configuration(
                "RAVE_PUBLIC_KEY is required (or pass the public key directly)",
            ));
        }

        if self.secret_key.trim().is_empty() {
            return Err(RaveError::configuration(
                "RAVE_SECRET_KEY is required (or pass the secret key directly)",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(RaveError::configuration(
                "RAVE_TIMEOUT_SECS must be greater than 0",
            ));
        }

        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RaveError::configuration(format!(
                    "RAVE_BASE_URL must be an http(s) URL, got {}",
                    url
                )));
            }
        }

        Ok(())
    }
}

use std::env;
use std::fmt;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ADDRESS: &str = "https://app.terraform.io";
pub const ENV_ADDRESS: &str = "TF_ADDRESS";
pub const ENV_TOKEN: &str = "TF_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("registry API token is required (set TF_TOKEN or pass --token)")]
    MissingToken,

    #[error("invalid registry address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// Registry address and credentials. Built once, then shared read-only by
/// every operation client.
#[derive(Clone)]
pub struct Config {
    address: String,
    token: String,
}

impl Config {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = address.into();
        let address = raw.trim().trim_end_matches('/').to_string();
        let token = token.into();

        match Url::parse(&address) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            Ok(url) => {
                return Err(ConfigError::InvalidAddress {
                    address: raw,
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                })
            }
            Err(e) => {
                return Err(ConfigError::InvalidAddress {
                    address: raw,
                    reason: e.to_string(),
                })
            }
        }

        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        Ok(Self { address, token })
    }

    /// Load from `TF_ADDRESS` (optional) and `TF_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(None, None)
    }

    /// Like [`Config::from_env`], with explicit values taking priority.
    pub fn from_env_with(
        address: Option<String>,
        token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let address = address
            .or_else(|| env::var(ENV_ADDRESS).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let token = token
            .or_else(|| env::var(ENV_TOKEN).ok())
            .ok_or(ConfigError::MissingToken)?;
        Self::new(address, token)
    }

    /// Base address without trailing slashes.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .finish()
    }
}

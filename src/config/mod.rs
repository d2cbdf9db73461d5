mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};

const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SEC: u64 = 10;

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform gateway, e.g. "https://gateway.example.com".
    pub gateway_url: String,
    pub request_timeout_sec: u64,
    pub connect_timeout_sec: u64,
}

impl ClientConfig {
    /// Configuration with default timeouts for the given gateway.
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            connect_timeout_sec: DEFAULT_CONNECT_TIMEOUT_SEC,
        }
    }

    /// Resolve configuration from programmatic values and an optional TOML
    /// file config. TOML values override programmatic values where present.
    pub fn resolve(base: ClientConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let resolved = Self {
            gateway_url: file.gateway_url.unwrap_or(base.gateway_url),
            request_timeout_sec: file.request_timeout_sec.unwrap_or(base.request_timeout_sec),
            connect_timeout_sec: file.connect_timeout_sec.unwrap_or(base.connect_timeout_sec),
        };

        resolved.validate()?;
        Ok(resolved)
    }

    fn validate(&self) -> Result<()> {
        if self.gateway_url.is_empty() {
            bail!("gateway_url must not be empty");
        }
        if !self.gateway_url.starts_with("http://") && !self.gateway_url.starts_with("https://") {
            bail!(
                "gateway_url must start with http:// or https://, got: {}",
                self.gateway_url
            );
        }
        if self.request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than zero");
        }
        if self.connect_timeout_sec == 0 {
            bail!("connect_timeout_sec must be greater than zero");
        }
        Ok(())
    }
}

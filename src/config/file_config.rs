use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML overrides for [`super::ClientConfig`].
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub gateway_url: Option<String>,
    pub request_timeout_sec: Option<u64>,
    pub connect_timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

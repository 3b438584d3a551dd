//! Server configuration: TOML file plus command-line overrides

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use text_locator::LocatorConfig;

/// `[server]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request locate timeout in milliseconds
    pub timeout_ms: u64,
    /// Requests per second per IP
    pub rate_limit: u32,
    /// Largest accepted request body (the PDF travels base64-encoded)
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            timeout_ms: 30_000,
            rate_limit: 10,
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Whole config file
///
/// ```toml
/// [server]
/// port = 8080
/// timeout_ms = 10000
///
/// [locator]
/// enable_fallback = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub locator: LocatorConfig,
}

impl FileConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

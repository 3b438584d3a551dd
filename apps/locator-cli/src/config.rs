//! Optional TOML configuration file

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use text_locator::LocatorConfig;

/// Contents of `--config <file>`
///
/// ```toml
/// [locator]
/// enable_fallback = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub locator: LocatorConfig,
}

impl FileConfig {
    /// No path means all defaults. A path that cannot be read or parsed is an error.
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

    /// Apply command-line overrides on top of the file values
    pub fn locator_config(&self, no_fallback: bool) -> LocatorConfig {
        let mut config = self.locator.clone();
        if no_fallback {
            config.enable_fallback = false;
        }
        config
    }
}

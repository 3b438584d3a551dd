use serde::{Deserialize, Serialize};

/// Tunables for a locate request
///
/// Loaded from the `[locator]` table of the binaries' TOML config file.
/// Missing keys fall back to [`LocatorConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Run the normalized span fallback when exact search misses a page
    pub enable_fallback: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            enable_fallback: true,
        }
    }
}

impl LocatorConfig {
    pub fn direct_only() -> Self {
        Self {
            enable_fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_fallback() {
        assert!(LocatorConfig::default().enable_fallback);
        assert!(!LocatorConfig::direct_only().enable_fallback);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: LocatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LocatorConfig::default());
    }

    #[test]
    fn test_toml_table_parses() {
        let config: LocatorConfig = toml::from_str("enable_fallback = false").unwrap();
        assert_eq!(config, LocatorConfig::direct_only());
    }
}

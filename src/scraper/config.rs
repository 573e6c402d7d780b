use serde::{Deserialize, Serialize};

/// Configuration for article extraction and offline snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// A readable block shorter than this (in characters) falls through
    /// to the next heuristic (default: 500)
    pub min_content_length: usize,

    /// Maximum distinct external stylesheets fetched per snapshot (default: 10)
    pub max_stylesheets: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            min_content_length: 500,
            max_stylesheets: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ScraperConfig::default();
        assert_eq!(config.min_content_length, 500);
        assert_eq!(config.max_stylesheets, 10);
    }

    #[test]
    fn test_partial_deserialization() {
        let config: ScraperConfig = toml::from_str("max_stylesheets = 3").unwrap();
        assert_eq!(config.max_stylesheets, 3);
        assert_eq!(config.min_content_length, 500);
    }
}

// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub media: MediaConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Connection timeout in seconds, 0 disables it
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Media serving configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Directory request paths are resolved against
    pub root: String,
    /// Re-stat files on every request instead of caching sizes
    #[serde(default)]
    pub no_cache: bool,
    /// Extra or overriding extension → Content-Type entries
    #[serde(default)]
    pub types: HashMap<String, String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: "media".to_string(),
            no_cache: false,
            types: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_section_from_toml() {
        let media: MediaConfig = toml::from_str(
            r#"
            root = "/srv/media"
            no_cache = true

            [types]
            ".mkv" = "video/x-matroska"
            "#,
        )
        .unwrap();
        assert_eq!(media.root, "/srv/media");
        assert!(media.no_cache);
        assert_eq!(media.types[".mkv"], "video/x-matroska");
    }

    #[test]
    fn test_media_section_defaults() {
        let media: MediaConfig = toml::from_str(r#"root = "videos""#).unwrap();
        assert!(!media.no_cache);
        assert!(media.types.is_empty());
    }
}

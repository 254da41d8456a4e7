// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, MediaConfig, PerformanceConfig, ServerConfig};

/// Prefix for environment overrides, e.g. `MEDIAPIPE_MEDIA__ROOT`
const ENV_PREFIX: &str = "MEDIAPIPE";

impl Config {
    /// Load configuration from `config.toml` in the working directory
    pub fn load() -> Result<Self, ServerError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, ServerError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 0)?
            .set_default("media.root", "media")?
            .set_default("media.no_cache", false)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let cfg = Config::load_from(&missing.to_string_lossy()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.media.root, "media");
        assert!(!cfg.media.no_cache);
        assert_eq!(cfg.performance.read_timeout, 0);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[media]
root = "/srv/videos"
no_cache = true

[media.types]
mkv = "video/x-matroska"
"#
        )
        .unwrap();

        let base = dir.path().join("server");
        let cfg = Config::load_from(&base.to_string_lossy()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.media.root, "/srv/videos");
        assert!(cfg.media.no_cache);
        assert_eq!(cfg.media.types["mkv"], "video/x-matroska");
    }
}

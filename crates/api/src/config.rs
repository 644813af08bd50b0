//! Service configuration
//!
//! Layered as defaults, then an optional TOML file (`bearing.toml`, or the
//! path in `BEARING_CONFIG`), then `BEARING__SECTION__KEY` environment
//! variables.

use feature_engine::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use streaming::StreamConfig;
use thiserror::Error;

/// Default configuration file
pub const DEFAULT_CONFIG_FILE: &str = "bearing.toml";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "BEARING_CONFIG";

/// Errors while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Classifier artifact location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub manifest: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("models/manifest.json"),
        }
    }
}

/// Recorded dataset location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub directory: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data/raw"),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub model: ModelConfig,
    pub dataset: DatasetConfig,
    pub stream: StreamConfig,
    pub validation: ValidationConfig,
}

impl AppConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load from a specific (optional) file and the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("BEARING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-section consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.stream.window_len < self.validation.min_samples {
            return Err(ConfigError::Invalid(format!(
                "stream.window_len {} is below validation.min_samples {}",
                self.stream.window_len, self.validation.min_samples
            )));
        }
        if self.validation.min_samples > self.validation.max_samples {
            return Err(ConfigError::Invalid(format!(
                "validation.min_samples {} exceeds validation.max_samples {}",
                self.validation.min_samples, self.validation.max_samples
            )));
        }
        if self.stream.tick_interval_ms == 0 || self.stream.retry_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "stream intervals must be positive".to_string(),
            ));
        }
        if self.stream.real_points == 0 || self.stream.synthetic_points == 0 {
            return Err(ConfigError::Invalid(
                "stream.real_points and stream.synthetic_points must be positive".to_string(),
            ));
        }
        if self.stream.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "stream.channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed bind address
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server.bind '{}': {}", self.server.bind, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.stream.tick_interval_ms, 50);
        assert_eq!(config.stream.window_len, 100);
        assert_eq!(config.validation.min_samples, 100);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.stream.real_points, 500);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bearing.toml");
        std::fs::write(
            &path,
            r#"
[server]
bind = "127.0.0.1:9100"

[model]
manifest = "/srv/models/rf/manifest.json"

[stream]
synthetic_points = 50
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9100");
        assert_eq!(config.model.manifest, PathBuf::from("/srv/models/rf/manifest.json"));
        assert_eq!(config.stream.synthetic_points, 50);
        // Untouched keys keep their defaults
        assert_eq!(config.stream.real_points, 500);
    }

    #[test]
    fn test_window_below_minimum_rejected() {
        let mut config = AppConfig::default();
        config.stream.window_len = 64;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_stream_points_rejected() {
        let mut config = AppConfig::default();
        config.stream.real_points = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.stream.synthetic_points = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_stream_points_in_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bearing.toml");
        std::fs::write(&path, "[stream]\nreal_points = 0\n").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let mut config = AppConfig::default();
        config.server.bind = "localhost".to_string();
        assert!(matches!(config.bind_addr(), Err(ConfigError::Invalid(_))));
    }
}

//! Configuration loading for the capability server binary.
//!
//! The canonical configuration lives in `vireo-config.yaml` at the
//! project root. This module defines the top-level typed structure that
//! mirrors the YAML sections and provides a loader that reads the file;
//! every section and field falls back to its documented default when
//! absent, so an empty or missing file yields a fully working server.

use std::path::Path;

use serde::Deserialize;
use vireo_caps::longpoll::PollConfig;
use vireo_caps::server::ServerConfig;
use vireo_queue::QueueConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Logging configuration (the `logging` section of the config file).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset, e.g. `info` or
    /// `vireo_queue=debug`.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    String::from("info")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `vireo-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VireoConfig {
    /// Queue lifecycle and response-id settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Long-poll timing settings.
    #[serde(default)]
    pub poll: PollConfig,

    /// Bind address settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VireoConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = VireoConfig::parse("{}").unwrap();
        assert_eq!(config, VireoConfig::default());
        assert!(config.queue.validate().is_ok());
    }

    #[test]
    fn sections_override_defaults_independently() {
        let yaml = r"
queue:
  registration_markers: 3
poll:
  no_events_timeout_ms: 25000
server:
  port: 9090
logging:
  level: debug
";
        let config = VireoConfig::parse(yaml).unwrap();
        assert_eq!(config.queue.registration_markers, 3);
        assert_eq!(config.queue.response_id_bound, 30_000_000);
        assert_eq!(config.poll.no_events_timeout_ms, 25_000);
        assert_eq!(config.poll.poll_interval_ms, 250);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let result = VireoConfig::parse("queue: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}

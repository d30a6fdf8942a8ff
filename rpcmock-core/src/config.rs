//! Configuration types for rpcmock

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MockConfig {
    /// Replay configuration
    #[serde(default)]
    pub replay: ReplayConfig,

    /// Capture configuration
    #[serde(default)]
    pub capture: CaptureSettings,
}

/// Replay engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReplayConfig {
    /// Capture log to replay from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Lower bound of synthetic latency
    #[serde(default, with = "humantime_serde")]
    pub min_delay: Duration,

    /// Upper bound of synthetic latency; `<= min_delay` disables it
    #[serde(default, with = "humantime_serde")]
    pub max_delay: Duration,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CaptureSettings {
    /// Log to write captured calls to; unset or empty disables capture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

/// Builder for MockConfig
pub struct ConfigBuilder {
    config: MockConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: MockConfig::default(),
        }
    }

    /// Set the log to replay from
    pub fn replay_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.replay.log_path = Some(path.into());
        self
    }

    /// Set the synthetic latency bounds
    pub fn delay(mut self, min: Duration, max: Duration) -> Self {
        self.config.replay.min_delay = min;
        self.config.replay.max_delay = max;
        self
    }

    /// Set the log to capture to
    pub fn capture_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.capture.output_path = Some(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> MockConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (rpcmock.toml)
    /// 3. Environment variable overrides (`RPCMOCK_REPLAY__MAX_DELAY=50ms`)
    /// 4. File named by RPCMOCK_CONFIG_PATH, if set
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(MockConfig::default()))
            .merge(Toml::file("rpcmock.toml"))
            .merge(Env::prefixed("RPCMOCK_").ignore(&["CONFIG_PATH"]).split("__"));

        if let Ok(path) = std::env::var("RPCMOCK_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: MockConfig = figment.extract().map_err(|e| {
            crate::error::MockError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: MockConfig = Figment::from(Serialized::defaults(MockConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                crate::error::MockError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> crate::error::Result<()> {
        if let Some(path) = &self.replay.log_path {
            if path.as_os_str().is_empty() {
                return Err(crate::error::MockError::Configuration(
                    "replay.log_path must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

//! Host configuration loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default, rename = "loop")]
    pub cadence: CadenceConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Robot device endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_frame_timeout_ms")]
    pub frame_timeout_ms: u64,
}

/// Control-loop timing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CadenceConfig {
    /// Delay between cycles while the camera link is healthy.
    #[serde(default = "default_fast_cadence_ms")]
    pub fast_cadence_ms: u64,

    /// Delay between reconnect attempts after a fetch failure.
    #[serde(default = "default_slow_cadence_ms")]
    pub slow_cadence_ms: u64,

    /// Pause between the lift command and the arrival signal.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub path: Option<String>,
}

fn default_base_url() -> String {
    "http://192.168.1.1".to_string()
}
fn default_frame_timeout_ms() -> u64 {
    2000
}
fn default_fast_cadence_ms() -> u64 {
    10
}
fn default_slow_cadence_ms() -> u64 {
    3000
}
fn default_settle_ms() -> u64 {
    500
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            frame_timeout_ms: default_frame_timeout_ms(),
        }
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            fast_cadence_ms: default_fast_cadence_ms(),
            slow_cadence_ms: default_slow_cadence_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded configuration from: {}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.base_url.is_empty() {
            return Err(ConfigError::Invalid("device.base_url must be set".into()));
        }
        if !self.device.base_url.starts_with("http://") && !self.device.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "device.base_url must be an http(s) URL, got '{}'",
                self.device.base_url
            )));
        }
        if self.device.frame_timeout_ms == 0 {
            return Err(ConfigError::Invalid("device.frame_timeout_ms must be positive".into()));
        }
        if self.cadence.fast_cadence_ms == 0 || self.cadence.slow_cadence_ms == 0 {
            return Err(ConfigError::Invalid("loop cadences must be positive".into()));
        }
        Ok(())
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.device.frame_timeout_ms)
    }

    pub fn fast_cadence(&self) -> Duration {
        Duration::from_millis(self.cadence.fast_cadence_ms)
    }

    pub fn slow_cadence(&self) -> Duration {
        Duration::from_millis(self.cadence.slow_cadence_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.cadence.settle_ms)
    }
}

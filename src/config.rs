//! Configuration: optional TOML file, then `PASSPORT_GATE_*` environment
//! overrides, then validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use crate::core::ThresholdPolicy;
use crate::error::ConfigError;
use crate::{CHANNEL_CAPACITY, GRACE_PERIOD_MS, LAYOUT_GUIDE_HEIGHT, LAYOUT_GUIDE_WIDTH};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Acceptance tolerances
    pub thresholds: ThresholdPolicy,
    /// Per-session behaviour
    pub session: SessionConfig,
    /// HTTP adapter
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a face must stay valid before a smile counts
    pub grace_period_ms: u64,
    /// Bounded queue size between detection sources and the validator
    pub channel_capacity: usize,
    /// Initial state of the diagnostic overlay toggle
    pub debug_enabled: bool,
    pub layout_guide_width: f64,
    pub layout_guide_height: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: GRACE_PERIOD_MS,
            channel_capacity: CHANNEL_CAPACITY,
            debug_enabled: false,
            layout_guide_width: LAYOUT_GUIDE_WIDTH,
            layout_guide_height: LAYOUT_GUIDE_HEIGHT,
        }
    }
}

impl SessionConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Load from an optional file, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from `PASSPORT_GATE_*` variables; unparsable values are ignored
    pub fn apply_env(&mut self) {
        if let Some(ms) = env_parse("PASSPORT_GATE_GRACE_PERIOD_MS") {
            self.session.grace_period_ms = ms;
        }
        if let Some(capacity) = env_parse("PASSPORT_GATE_CHANNEL_CAPACITY") {
            self.session.channel_capacity = capacity;
        }
        if let Ok(v) = std::env::var("PASSPORT_GATE_DEBUG") {
            self.session.debug_enabled = v != "0";
        }
        if let Ok(addr) = std::env::var("PASSPORT_GATE_ADDR") {
            self.server.addr = addr;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.session.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be > 0".to_string()));
        }
        if !(self.session.layout_guide_width > 0.0) || !(self.session.layout_guide_height > 0.0) {
            return Err(ConfigError::Invalid(
                "layout guide width and height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

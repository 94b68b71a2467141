//! Instrument configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! instrument_id = "living-room-tv"
//! ping_interval_ms = 30000
//! log_level = "debug"
//!
//! [reservoir]
//! capacity = 100
//! window = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelemetryError};
use crate::logging::LogLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Random UUID when absent.
    pub instrument_id: Option<String>,
    /// Keep-alive period started by the hub on `Start`.
    pub ping_interval_ms: u64,
    pub log_level: LogLevel,
    pub reservoir: ReservoirConfig,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            instrument_id: None,
            ping_interval_ms: 30_000,
            log_level: LogLevel::default(),
            reservoir: ReservoirConfig::default(),
        }
    }
}

/// Settings for [`SamplingBackend`](crate::backend::SamplingBackend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservoirConfig {
    /// Metrics retained per window.
    pub capacity: usize,
    /// Metrics seen before the reservoir is drained.
    pub window: usize,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            window: 1000,
        }
    }
}

impl InstrumentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: InstrumentConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TelemetryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(target: "playback_telemetry::config", path = %path.display(), "loaded instrument config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ping_interval_ms == 0 {
            return Err(TelemetryError::InvalidConfig {
                field: "ping_interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if self.reservoir.capacity == 0 {
            return Err(TelemetryError::InvalidConfig {
                field: "reservoir.capacity",
                reason: "must be greater than zero".into(),
            });
        }
        if self.reservoir.window < self.reservoir.capacity {
            return Err(TelemetryError::InvalidConfig {
                field: "reservoir.window",
                reason: format!(
                    "{} is smaller than capacity {}",
                    self.reservoir.window, self.reservoir.capacity
                ),
            });
        }
        if matches!(&self.instrument_id, Some(id) if id.trim().is_empty()) {
            return Err(TelemetryError::InvalidConfig {
                field: "instrument_id",
                reason: "must not be blank".into(),
            });
        }
        Ok(())
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }
}

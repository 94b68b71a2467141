//! Crate-level error type.
//!
//! The event pipeline itself never fails: rejection is a return value. Errors
//! only come from the edges (configuration, scenario files, serialization).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("scenario step {step} refers to unknown tracker `{tracker}`")]
    UnknownScenarioTracker { step: usize, tracker: String },

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

//! Log level and subscriber setup.
//!
//! The level is plain configuration handed to [`init`]; nothing in the
//! pipeline reads a global. `RUST_LOG`, when set, wins over the configured
//! level.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Verbose,
    Debug,
    #[default]
    Warning,
    Error,
    None,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Verbose => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::None => LevelFilter::OFF,
        }
    }
}

/// Install a stderr fmt subscriber. Returns `false` if one was already set.
pub fn init(level: LogLevel) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.as_filter().into()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::Verbose.as_filter(), LevelFilter::TRACE);
        assert_eq!(LogLevel::Warning.as_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::None.as_filter(), LevelFilter::OFF);
    }

    #[test]
    fn test_default_is_warning() {
        assert_eq!(LogLevel::default(), LogLevel::Warning);
    }

    #[test]
    fn test_init_twice_is_noop() {
        init(LogLevel::None);
        assert!(!init(LogLevel::None));
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "playback-telemetry")]
#[command(version)]
#[command(about = "Replay a scripted playback session through the telemetry pipeline")]
pub struct Args {
    /// Scenario file (TOML) with trackers and timed steps
    pub scenario: PathBuf,

    /// Instrument configuration file (TOML)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Playback speed multiplier; 0 replays without delays
    #[arg(long, default_value = "1.0", value_parser = parse_speed)]
    pub speed: f64,

    /// Reservoir-sample metrics using the configured capacity and window
    #[arg(long)]
    pub sample: bool,

    /// Override the configured log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Skip the summary on stderr
    #[arg(long, short)]
    pub quiet: bool,
}

fn parse_speed(s: &str) -> Result<f64, String> {
    let speed: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(format!("speed must be a finite, non-negative number, got {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["playback-telemetry", "session.toml"]);
        assert_eq!(args.scenario, PathBuf::from("session.toml"));
        assert_eq!(args.speed, 1.0);
        assert!(!args.sample);
        assert!(args.config.is_none());
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "playback-telemetry",
            "s.toml",
            "--speed",
            "0",
            "--sample",
            "--log-level",
            "debug",
            "-c",
            "inst.toml",
        ]);
        assert_eq!(args.speed, 0.0);
        assert!(args.sample);
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(args.config, Some(PathBuf::from("inst.toml")));
    }

    #[test]
    fn test_rejects_bad_speed() {
        for speed in ["nan", "inf", "-2", "fast"] {
            let result = Args::try_parse_from(["playback-telemetry", "s.toml", "--speed", speed]);
            assert!(result.is_err(), "accepted --speed {speed}");
        }
    }
}

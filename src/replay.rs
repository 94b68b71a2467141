//! # Scenario replay
//!
//! ## Responsibility
//! Load a scripted playback session from TOML and drive it through an
//! [`Instrument`] with real (optionally scaled) delays, so the whole
//! pipeline can be exercised without a player.
//!
//! ```toml
//! [[trackers]]
//! name = "content"
//! target = "html5"
//!
//! [[trackers]]
//! name = "ads"
//! ads = true
//!
//! [[steps]]
//! tracker = "content"
//! action = "MediaRequest"
//!
//! [[steps]]
//! tracker = "content"
//! action = "Start"
//! wait_ms = 800
//! position_ms = 0
//! ```
//!
//! ## Guarantees
//! - A scenario is fully validated (tracker names, action names) before any
//!   tracker is added to the instrument.
//! - Due pings are emitted while waiting between steps.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TelemetryError};
use crate::instrument::{EmitOutcome, Instrument};
use crate::model::{Action, TrackerId};
use crate::tracker::{PlayerHandle, PlayerTracker};

/// Granularity of ping polling while a step waits.
const PING_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTracker {
    pub name: String,
    /// `trackerTarget` reported by the tracker. Defaults to `name`.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub ads: bool,
    /// Actions this tracker vetoes.
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub tracker: String,
    pub action: String,
    /// Delay before the action, in milliseconds.
    #[serde(default)]
    pub wait_ms: u64,
    /// Player position to publish before the action.
    #[serde(default)]
    pub position_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub trackers: Vec<ScenarioTracker>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Tally of what happened to every scripted step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub delivered: usize,
    pub rejected: usize,
    pub vetoed: usize,
    /// Steps that hit an unwired instrument.
    pub dropped: usize,
    pub pings: usize,
}

impl ReplayReport {
    fn record(&mut self, outcome: EmitOutcome) {
        self.steps += 1;
        match outcome {
            EmitOutcome::Delivered => self.delivered += 1,
            EmitOutcome::Rejected => self.rejected += 1,
            EmitOutcome::Vetoed => self.vetoed += 1,
            EmitOutcome::NotWired | EmitOutcome::UnknownTracker => self.dropped += 1,
        }
    }
}

struct ResolvedStep {
    tracker: usize,
    action: Action,
    wait: Duration,
    position_ms: Option<u64>,
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(s)?;
        scenario.resolve(1.0)?;
        Ok(scenario)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TelemetryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_toml_str(&text)?;
        info!(
            target: "playback_telemetry::replay",
            path = %path.display(),
            trackers = scenario.trackers.len(),
            steps = scenario.steps.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    /// Sum of all step delays at normal speed.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.steps.iter().map(|s| s.wait_ms).sum())
    }

    fn resolve(&self, speed: f64) -> Result<Vec<ResolvedStep>> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(TelemetryError::InvalidConfig {
                field: "speed",
                reason: format!("must be a finite, non-negative number, got {speed}"),
            });
        }
        let index: HashMap<&str, usize> = self
            .trackers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();
        for tracker in &self.trackers {
            for name in &tracker.ignore {
                resolve_action(name)?;
            }
        }

        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let tracker = *index.get(step.tracker.as_str()).ok_or_else(|| {
                    TelemetryError::UnknownScenarioTracker {
                        step: i,
                        tracker: step.tracker.clone(),
                    }
                })?;
                Ok(ResolvedStep {
                    tracker,
                    action: resolve_action(&step.action)?,
                    wait: scaled(step.wait_ms, speed),
                    position_ms: step.position_ms,
                })
            })
            .collect()
    }

    /// Add the scenario's trackers to `instrument`, make it ready, and play
    /// every step. `speed` divides every delay; `0` skips them. A negative or
    /// non-finite speed is an error and leaves the instrument untouched.
    pub async fn run(&self, instrument: &mut Instrument, speed: f64) -> Result<ReplayReport> {
        let steps = self.resolve(speed)?;

        let mut trackers: Vec<(TrackerId, PlayerHandle)> = Vec::with_capacity(self.trackers.len());
        for spec in &self.trackers {
            let target = spec.target.clone().unwrap_or_else(|| spec.name.clone());
            let mut tracker = if spec.ads {
                PlayerTracker::ads(target)
            } else {
                PlayerTracker::new(target)
            };
            for name in &spec.ignore {
                tracker = tracker.ignoring(resolve_action(name)?);
            }
            let handle = tracker.player();
            let id = instrument.add_tracker(tracker);
            debug!(target: "playback_telemetry::replay", name = %spec.name, tracker = %id, "scenario tracker added");
            trackers.push((id, handle));
        }
        instrument.ready();

        let mut report = ReplayReport::default();
        for step in steps {
            report.pings += wait(instrument, step.wait).await;
            let (id, handle) = &trackers[step.tracker];
            if let Some(position) = step.position_ms {
                handle.set_position(position);
            }
            let outcome = instrument.emit(&step.action, *id);
            debug!(target: "playback_telemetry::replay", action = %step.action, tracker = %id, ?outcome, "step");
            report.record(outcome);
        }
        instrument.flush();
        Ok(report)
    }
}

fn resolve_action(name: &str) -> Result<Action> {
    Action::from_name(name).ok_or_else(|| TelemetryError::UnknownAction(name.to_string()))
}

fn scaled(wait_ms: u64, speed: f64) -> Duration {
    if speed <= 0.0 || wait_ms == 0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(wait_ms as f64 / 1000.0 / speed).unwrap_or(Duration::MAX)
}

/// Sleep for `total`, emitting pings that fall due. Returns pings emitted.
async fn wait(instrument: &mut Instrument, total: Duration) -> usize {
    let deadline = Instant::now() + total;
    let mut pings = 0;
    loop {
        let now = Instant::now();
        pings += instrument.tick_pings(now);
        if now >= deadline {
            return pings;
        }
        tokio::time::sleep((deadline - now).min(PING_POLL)).await;
    }
}

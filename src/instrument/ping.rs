//! Keep-alive timers.
//!
//! The hub starts a timer on `Start`/`AdBegin` and stops it on terminal
//! actions. Timers are plain deadlines; something has to poll them. Hosts
//! with their own loop call [`Instrument::tick_pings`]. Hosts on tokio can
//! use [`spawn_driver`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::Instrument;
use crate::model::TrackerId;

/// Keep-alive period used when nothing else is configured.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
struct PingTimer {
    interval: Duration,
    next_due: Instant,
}

/// One periodic deadline per tracker.
#[derive(Debug, Default)]
pub struct PingTimers {
    timers: HashMap<TrackerId, PingTimer>,
}

impl PingTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer for a tracker. The first ping is due one
    /// `interval` from now.
    pub fn start(&mut self, tracker_id: TrackerId, interval: Duration) {
        self.start_at(tracker_id, interval, Instant::now());
    }

    pub fn start_at(&mut self, tracker_id: TrackerId, interval: Duration, now: Instant) {
        tracing::debug!(target: "playback_telemetry::ping", tracker = %tracker_id, ?interval, "ping started");
        self.timers.insert(
            tracker_id,
            PingTimer {
                interval,
                next_due: now + interval,
            },
        );
    }

    pub fn stop(&mut self, tracker_id: TrackerId) -> bool {
        let stopped = self.timers.remove(&tracker_id).is_some();
        if stopped {
            tracing::debug!(target: "playback_telemetry::ping", tracker = %tracker_id, "ping stopped");
        }
        stopped
    }

    pub fn is_active(&self, tracker_id: TrackerId) -> bool {
        self.timers.contains_key(&tracker_id)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Trackers whose ping is due at `now`, in ascending id order.
    ///
    /// Each due timer is re-armed one interval later. A timer that fell more
    /// than one interval behind fires once and resumes from `now`.
    pub fn due(&mut self, now: Instant) -> Vec<TrackerId> {
        let mut due = Vec::new();
        for (id, timer) in self.timers.iter_mut() {
            if timer.next_due > now {
                continue;
            }
            due.push(*id);
            timer.next_due += timer.interval;
            if timer.next_due <= now {
                timer.next_due = now + timer.interval;
            }
        }
        due.sort_unstable();
        due
    }
}

/// Spawn a task that polls the instrument's ping timers every `resolution`.
///
/// Runs until the returned handle is aborted.
pub fn spawn_driver(instrument: Arc<Mutex<Instrument>>, resolution: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(resolution);
        loop {
            ticker.tick().await;
            let emitted = instrument.lock().await.tick_pings(Instant::now());
            if emitted > 0 {
                tracing::trace!(target: "playback_telemetry::ping", emitted, "ping tick");
            }
        }
    })
}

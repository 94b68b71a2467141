//! # Instrument
//!
//! ## Responsibility
//! Owns the tracker registry, the getter table, the ping timers and the
//! hub / metricalc / backend chain, and drives every event through it:
//!
//! ```text
//! emit(action, tracker)
//!   └─► build Event (senderId, timeSince*)
//!        └─► tracker.init_event ──► hub.process_event ──► metricalc ──► backend
//!                 (veto)              (reject)                          metrics, then event
//! ```
//!
//! ## Guarantees
//! - Tracker ids are assigned from a monotonic counter and never reused.
//! - `ready()` walks backend, metricalc, hub, then trackers. `shutdown()`
//!   walks the reverse.
//! - A `timeSince<Action>` clock only moves when an event for that action
//!   reaches the backend.
//! - Everything is synchronous. Callers sharing an instrument across threads
//!   wrap it in a mutex.
//!
//! ## NOT Responsible For
//! - Transport and serialization (backend)
//! - Translating player callbacks (trackers)

mod context;
mod getters;
pub mod ping;

pub use context::{HubContext, TrackerContext};
pub use getters::{Getter, GetterRegistry};
pub use ping::PingTimers;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, trace};

use crate::component::{Backend, Hub, Metricalc, Tracker};
use crate::config::InstrumentConfig;
use crate::model::{Action, Attribute, Event, TrackerId};
pub(crate) use context::TrackerMap;

/// What happened to an emitted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Metrics and event reached the backend.
    Delivered,
    /// No hub or no backend is set.
    NotWired,
    UnknownTracker,
    /// The tracker's `init_event` dropped the event.
    Vetoed,
    /// The hub's state machine refused the event.
    Rejected,
}

impl EmitOutcome {
    pub fn is_delivered(self) -> bool {
        self == EmitOutcome::Delivered
    }
}

/// The orchestrator wiring trackers, hub, metricalc and backend.
pub struct Instrument {
    instrument_id: String,
    trackers: TrackerMap,
    next_tracker_id: u32,
    getters: GetterRegistry,
    pings: PingTimers,
    hub: Option<Box<dyn Hub>>,
    metricalc: Option<Box<dyn Metricalc>>,
    backend: Option<Box<dyn Backend>>,
    time_since: HashMap<Attribute, Instant>,
}

impl Instrument {
    /// An instrument with no components. `emit` is a no-op until a hub and a
    /// backend are set.
    pub fn new(config: &InstrumentConfig) -> Self {
        let instrument_id = config
            .instrument_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        debug!(target: "playback_telemetry::instrument", id = %instrument_id, "instrument created");
        Self {
            instrument_id,
            trackers: TrackerMap::new(),
            next_tracker_id: 0,
            getters: GetterRegistry::new(),
            pings: PingTimers::new(),
            hub: None,
            metricalc: None,
            backend: None,
            time_since: HashMap::new(),
        }
    }

    pub fn with_hub(mut self, hub: impl Hub + 'static) -> Self {
        self.set_hub(hub);
        self
    }

    pub fn with_metricalc(mut self, metricalc: impl Metricalc + 'static) -> Self {
        self.set_metricalc(metricalc);
        self
    }

    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.set_backend(backend);
        self
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Replace the hub. The previous hub, if any, is ended first.
    pub fn set_hub(&mut self, hub: impl Hub + 'static) {
        if let Some(mut old) = self.hub.take() {
            old.end_of_service();
        }
        self.hub = Some(Box::new(hub));
    }

    pub fn set_metricalc(&mut self, metricalc: impl Metricalc + 'static) {
        if let Some(mut old) = self.metricalc.take() {
            old.end_of_service();
        }
        self.metricalc = Some(Box::new(metricalc));
    }

    pub fn set_backend(&mut self, backend: impl Backend + 'static) {
        if let Some(mut old) = self.backend.take() {
            old.end_of_service();
        }
        self.backend = Some(Box::new(backend));
    }

    pub fn has_hub(&self) -> bool {
        self.hub.is_some()
    }

    pub fn has_metricalc(&self) -> bool {
        self.metricalc.is_some()
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    // -----------------------------------------------------------------------
    // Trackers
    // -----------------------------------------------------------------------

    /// Register a tracker and return its new id. No lifecycle hook runs.
    pub fn add_tracker(&mut self, mut tracker: impl Tracker + 'static) -> TrackerId {
        let id = TrackerId(self.next_tracker_id);
        self.next_tracker_id += 1;
        tracker.set_tracker_id(id);
        self.trackers.insert(id, Box::new(tracker));
        debug!(target: "playback_telemetry::instrument", tracker = %id, "tracker added");
        id
    }

    /// End and drop a tracker together with its getters and ping timer.
    pub fn remove_tracker(&mut self, tracker_id: TrackerId) -> bool {
        let Some(mut tracker) = self.trackers.remove(&tracker_id) else {
            return false;
        };
        tracker.end_of_service();
        self.getters.clear_tracker(tracker_id);
        self.pings.stop(tracker_id);
        debug!(target: "playback_telemetry::instrument", tracker = %tracker_id, "tracker removed");
        true
    }

    /// Ids of every registered tracker, ascending.
    pub fn tracker_ids(&self) -> Vec<TrackerId> {
        self.trackers.keys().copied().collect()
    }

    pub fn tracker(&self, tracker_id: TrackerId) -> Option<&dyn Tracker> {
        self.trackers.get(&tracker_id).map(|t| t.as_ref())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Tell every component the chain is complete.
    pub fn ready(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.instrument_ready(&self.instrument_id);
        }
        if let Some(metricalc) = self.metricalc.as_mut() {
            metricalc.instrument_ready(&self.instrument_id);
        }
        if let Some(hub) = self.hub.as_mut() {
            hub.instrument_ready(&self.instrument_id);
        }
        for id in self.tracker_ids() {
            self.ready_tracker(id);
        }
    }

    fn ready_tracker(&mut self, tracker_id: TrackerId) {
        let Some(tracker) = self.trackers.get_mut(&tracker_id) else {
            return;
        };
        let mut ctx = TrackerContext::new(tracker_id, &self.instrument_id, &mut self.getters);
        tracker.instrument_ready(&mut ctx);
        for action in ctx.into_pending() {
            self.emit(&action, tracker_id);
        }
    }

    /// End every component, trackers first.
    pub fn shutdown(&mut self) {
        for (id, tracker) in self.trackers.iter_mut() {
            tracker.end_of_service();
            self.getters.clear_tracker(*id);
            self.pings.stop(*id);
        }
        if let Some(hub) = self.hub.as_mut() {
            hub.end_of_service();
        }
        if let Some(metricalc) = self.metricalc.as_mut() {
            metricalc.end_of_service();
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.end_of_service();
        }
        debug!(target: "playback_telemetry::instrument", id = %self.instrument_id, "instrument shut down");
    }

    /// Ask the backend to push out anything it holds back.
    pub fn flush(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.flush();
        }
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    /// Run one action through tracker, hub, metricalc and backend.
    pub fn emit(&mut self, action: &Action, tracker_id: TrackerId) -> EmitOutcome {
        let (Some(hub), Some(backend)) = (self.hub.as_mut(), self.backend.as_mut()) else {
            trace!(target: "playback_telemetry::instrument", %action, "emit ignored, instrument not wired");
            return EmitOutcome::NotWired;
        };

        let now = Instant::now();
        let mut event = Event::new(action.clone());
        event.set(
            Attribute::SENDER_ID,
            format!("{}-{}", self.instrument_id, tracker_id),
        );
        for (attribute, last) in &self.time_since {
            event.set(attribute.clone(), now.duration_since(*last).as_millis() as u64);
        }

        let Some(tracker) = self.trackers.get_mut(&tracker_id) else {
            debug!(target: "playback_telemetry::instrument", %action, tracker = %tracker_id, "emit for unknown tracker");
            return EmitOutcome::UnknownTracker;
        };
        let Some(event) = tracker.init_event(event) else {
            debug!(target: "playback_telemetry::instrument", %action, tracker = %tracker_id, "event vetoed by tracker");
            return EmitOutcome::Vetoed;
        };

        let mut ctx = HubContext::new(&mut self.trackers, &self.getters, &mut self.pings);
        let Some(event) = hub.process_event(event, tracker_id, &mut ctx) else {
            debug!(target: "playback_telemetry::instrument", %action, tracker = %tracker_id, "event rejected by hub");
            return EmitOutcome::Rejected;
        };

        if let (Some(metricalc), Some(tracker)) = (self.metricalc.as_mut(), self.trackers.get(&tracker_id)) {
            for metric in metricalc.process_metric(&event, tracker.as_ref()) {
                backend.send_metric(metric);
            }
        }
        backend.send_event(event);

        self.time_since.insert(action.time_since_attribute(), now);
        EmitOutcome::Delivered
    }

    /// When `action` was last delivered, if ever.
    pub fn last_emitted(&self, action: &Action) -> Option<Instant> {
        self.time_since.get(&action.time_since_attribute()).copied()
    }

    /// Emit a `Ping` for every tracker whose keep-alive is due at `now`.
    pub fn tick_pings(&mut self, now: Instant) -> usize {
        let due = self.pings.due(now);
        for id in &due {
            self.emit(&Action::PING, *id);
        }
        due.len()
    }

    pub fn is_pinging(&self, tracker_id: TrackerId) -> bool {
        self.pings.is_active(tracker_id)
    }

    /// Arm a keep-alive by hand. The hub normally does this on `Start`.
    pub fn start_ping(&mut self, tracker_id: TrackerId, interval: Duration) {
        self.pings.start(tracker_id, interval);
    }

    pub fn stop_ping(&mut self, tracker_id: TrackerId) {
        self.pings.stop(tracker_id);
    }

    // -----------------------------------------------------------------------
    // Getters
    // -----------------------------------------------------------------------

    pub fn register_getter<F>(&mut self, attribute: Attribute, getter: F, tracker_id: TrackerId)
    where
        F: Fn() -> Option<Value> + Send + 'static,
    {
        self.getters.register(attribute, Box::new(getter), tracker_id);
    }

    pub fn unregister_getter(&mut self, attribute: &Attribute, tracker_id: TrackerId) -> bool {
        self.getters.unregister(attribute, tracker_id)
    }

    pub fn call_getter(&self, attribute: &Attribute, tracker_id: TrackerId) -> Option<Value> {
        self.getters.call(attribute, tracker_id)
    }

    /// Call a getter and stamp a present value onto `event`.
    pub fn use_getter(&self, attribute: &Attribute, event: &mut Event, tracker_id: TrackerId) -> bool {
        self.getters.apply(attribute, event, tracker_id)
    }
}

impl std::fmt::Debug for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrument")
            .field("instrument_id", &self.instrument_id)
            .field("trackers", &self.tracker_ids())
            .field("next_tracker_id", &self.next_tracker_id)
            .field("getters", &self.getters)
            .field("pings", &self.pings)
            .field("has_hub", &self.has_hub())
            .field("has_metricalc", &self.has_metricalc())
            .field("has_backend", &self.has_backend())
            .finish()
    }
}

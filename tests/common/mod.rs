//! Shared fixtures: a scriptable tracker and components that journal their
//! lifecycle calls.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use playback_telemetry::backend::MemoryBackend;
use playback_telemetry::config::InstrumentConfig;
use playback_telemetry::hub::HubCore;
use playback_telemetry::instrument::{HubContext, TrackerContext};
use playback_telemetry::metricalc::MetricalcCore;
use playback_telemetry::{
    Action, Attribute, Backend, Component, Event, Hub, Instrument, Metric, Metricalc, State, Tracker, TrackerId,
};

/// Ordered record of calls shared between fixtures.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Tracker whose behaviour is set up per test.
#[derive(Debug, Default)]
pub struct TestTracker {
    id: Option<TrackerId>,
    state: State,
    name: String,
    vetoed: HashSet<Action>,
    stamps: Vec<(Attribute, Value)>,
    getters: Vec<(Attribute, Value)>,
    on_ready: Vec<Action>,
    journal: Journal,
}

impl TestTracker {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    pub fn veto(mut self, action: Action) -> Self {
        self.vetoed.insert(action);
        self
    }

    /// Attribute set on every event in `init_event`.
    pub fn stamp(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.stamps.push((attribute, value.into()));
        self
    }

    /// Getter returning a constant, registered on `instrument_ready`.
    pub fn getter(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.getters.push((attribute, value.into()));
        self
    }

    pub fn emit_on_ready(mut self, action: Action) -> Self {
        self.on_ready.push(action);
        self
    }
}

impl Tracker for TestTracker {
    fn tracker_id(&self) -> Option<TrackerId> {
        self.id
    }

    fn set_tracker_id(&mut self, id: TrackerId) {
        self.id = Some(id);
    }

    fn state(&self) -> &State {
        &self.state
    }

    fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    fn init_event(&mut self, mut event: Event) -> Option<Event> {
        if self.vetoed.contains(event.action()) {
            return None;
        }
        for (attribute, value) in &self.stamps {
            event.set(attribute.clone(), value.clone());
        }
        Some(event)
    }

    fn instrument_ready(&mut self, ctx: &mut TrackerContext<'_>) {
        self.journal.push(format!("tracker:{}:ready", self.name));
        for (attribute, value) in &self.getters {
            let value = value.clone();
            ctx.register_getter(attribute.clone(), move || Some(value.clone()));
        }
        for action in &self.on_ready {
            ctx.emit(action.clone());
        }
    }

    fn end_of_service(&mut self) {
        self.journal.push(format!("tracker:{}:end", self.name));
    }
}

// ---------------------------------------------------------------------------
// Journaling components
// ---------------------------------------------------------------------------

/// [`HubCore`] that journals its lifecycle.
pub struct JournalHub {
    pub name: &'static str,
    pub inner: HubCore,
    pub journal: Journal,
}

impl JournalHub {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            inner: HubCore::new(),
            journal: journal.clone(),
        }
    }
}

impl Component for JournalHub {
    fn instrument_ready(&mut self, _instrument_id: &str) {
        self.journal.push(format!("hub:{}:ready", self.name));
    }

    fn end_of_service(&mut self) {
        self.journal.push(format!("hub:{}:end", self.name));
    }
}

impl Hub for JournalHub {
    fn process_event(&mut self, event: Event, tracker_id: TrackerId, ctx: &mut HubContext<'_>) -> Option<Event> {
        self.inner.process_event(event, tracker_id, ctx)
    }
}

pub struct JournalMetricalc {
    pub inner: MetricalcCore,
    pub journal: Journal,
}

impl JournalMetricalc {
    pub fn new(journal: &Journal) -> Self {
        Self {
            inner: MetricalcCore::new(),
            journal: journal.clone(),
        }
    }
}

impl Component for JournalMetricalc {
    fn instrument_ready(&mut self, _instrument_id: &str) {
        self.journal.push("metricalc:ready");
    }

    fn end_of_service(&mut self) {
        self.journal.push("metricalc:end");
    }
}

impl Metricalc for JournalMetricalc {
    fn process_metric(&mut self, event: &Event, tracker: &dyn Tracker) -> Vec<Metric> {
        self.inner.process_metric(event, tracker)
    }
}

/// Backend journaling deliveries as `event:<Action>` / `metric:<Name>`.
pub struct JournalBackend {
    pub journal: Journal,
}

impl JournalBackend {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl Component for JournalBackend {
    fn instrument_ready(&mut self, _instrument_id: &str) {
        self.journal.push("backend:ready");
    }

    fn end_of_service(&mut self) {
        self.journal.push("backend:end");
    }
}

impl Backend for JournalBackend {
    fn send_event(&mut self, event: Event) {
        self.journal.push(format!("event:{}", event.action()));
    }

    fn send_metric(&mut self, metric: Metric) {
        self.journal.push(format!("metric:{}", metric.name()));
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub fn config(instrument_id: &str) -> InstrumentConfig {
    InstrumentConfig {
        instrument_id: Some(instrument_id.to_string()),
        ..InstrumentConfig::default()
    }
}

/// Instrument with `HubCore`, `MetricalcCore` and a memory backend.
pub fn wired() -> (Instrument, MemoryBackend) {
    let backend = MemoryBackend::new();
    let instrument = Instrument::new(&config("test"))
        .with_hub(HubCore::new())
        .with_metricalc(MetricalcCore::new())
        .with_backend(backend.clone());
    (instrument, backend)
}

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use super::getters::{Getter, GetterRegistry};
use super::ping::PingTimers;
use crate::component::Tracker;
use crate::model::{Action, Attribute, Event, State, TrackerId};

pub(crate) type TrackerMap = BTreeMap<TrackerId, Box<dyn Tracker>>;

/// What a hub may touch while processing one event.
///
/// Gives access to every registered tracker's state (ad state is shared
/// across trackers), the getter table, and the ping timers.
pub struct HubContext<'a> {
    trackers: &'a mut TrackerMap,
    getters: &'a GetterRegistry,
    pings: &'a mut PingTimers,
}

impl<'a> HubContext<'a> {
    pub(crate) fn new(
        trackers: &'a mut TrackerMap,
        getters: &'a GetterRegistry,
        pings: &'a mut PingTimers,
    ) -> Self {
        Self { trackers, getters, pings }
    }

    /// Ids of every registered tracker, ascending.
    pub fn tracker_ids(&self) -> Vec<TrackerId> {
        self.trackers.keys().copied().collect()
    }

    pub fn state(&self, tracker_id: TrackerId) -> Option<&State> {
        self.trackers.get(&tracker_id).map(|t| t.state())
    }

    pub fn state_mut(&mut self, tracker_id: TrackerId) -> Option<&mut State> {
        self.trackers.get_mut(&tracker_id).map(|t| t.state_mut())
    }

    /// Apply `f` to the state of every registered tracker.
    pub fn for_each_state(&mut self, mut f: impl FnMut(TrackerId, &mut State)) {
        for (id, tracker) in self.trackers.iter_mut() {
            f(*id, tracker.state_mut());
        }
    }

    pub fn call_getter(&self, attribute: &Attribute, tracker_id: TrackerId) -> Option<Value> {
        self.getters.call(attribute, tracker_id)
    }

    pub fn use_getter(&self, attribute: &Attribute, event: &mut Event, tracker_id: TrackerId) -> bool {
        self.getters.apply(attribute, event, tracker_id)
    }

    pub fn start_ping(&mut self, tracker_id: TrackerId, interval: Duration) {
        self.pings.start(tracker_id, interval);
    }

    pub fn stop_ping(&mut self, tracker_id: TrackerId) {
        self.pings.stop(tracker_id);
    }
}

/// Handed to a tracker during `instrument_ready`.
///
/// Getters registered here are bound to the tracker. Actions passed to
/// [`emit`](Self::emit) are queued and emitted by the instrument as soon as
/// the tracker's `instrument_ready` returns.
pub struct TrackerContext<'a> {
    tracker_id: TrackerId,
    instrument_id: &'a str,
    getters: &'a mut GetterRegistry,
    pending: Vec<Action>,
}

impl<'a> TrackerContext<'a> {
    pub(crate) fn new(tracker_id: TrackerId, instrument_id: &'a str, getters: &'a mut GetterRegistry) -> Self {
        Self {
            tracker_id,
            instrument_id,
            getters,
            pending: Vec::new(),
        }
    }

    pub fn tracker_id(&self) -> TrackerId {
        self.tracker_id
    }

    pub fn instrument_id(&self) -> &str {
        self.instrument_id
    }

    pub fn register_getter<F>(&mut self, attribute: Attribute, getter: F)
    where
        F: Fn() -> Option<Value> + Send + 'static,
    {
        let boxed: Getter = Box::new(getter);
        self.getters.register(attribute, boxed, self.tracker_id);
    }

    pub fn unregister_getter(&mut self, attribute: &Attribute) -> bool {
        self.getters.unregister(attribute, self.tracker_id)
    }

    pub fn emit(&mut self, action: Action) {
        self.pending.push(action);
    }

    pub(crate) fn into_pending(self) -> Vec<Action> {
        self.pending
    }
}

//! # Component contracts
//!
//! The instrument wires four kinds of components:
//!
//! ```text
//! Tracker ──► Hub ──► Metricalc ──► Backend
//!  (veto)   (accept/   (derive      (ship metrics,
//!            reject)    metrics)     then the event)
//! ```
//!
//! Hub, metricalc and backend share the [`Component`] lifecycle. Trackers get
//! a richer `instrument_ready` because that is where they install getters.

use crate::instrument::{HubContext, TrackerContext};
use crate::model::{Event, Metric, State, TrackerId};

/// Lifecycle shared by hub, metricalc and backend.
pub trait Component: Send {
    /// Called by [`Instrument::ready`](crate::Instrument::ready).
    fn instrument_ready(&mut self, _instrument_id: &str) {}

    /// Called on replacement, removal or shutdown.
    fn end_of_service(&mut self) {}
}

/// Adapter translating one player's native callbacks into catalog actions.
///
/// The tracker owns its [`State`] but never changes it itself: the hub does
/// that through `state_mut` while processing an event.
pub trait Tracker: Send {
    fn tracker_id(&self) -> Option<TrackerId>;

    /// Assigned once by the instrument on registration.
    fn set_tracker_id(&mut self, id: TrackerId);

    fn state(&self) -> &State;

    fn state_mut(&mut self) -> &mut State;

    /// Enrich a freshly built event, or return `None` to drop it.
    fn init_event(&mut self, event: Event) -> Option<Event> {
        Some(event)
    }

    /// Install getters and queue start-up actions.
    fn instrument_ready(&mut self, _ctx: &mut TrackerContext<'_>) {}

    fn end_of_service(&mut self) {}
}

/// Playback state machine: accepts or rejects events and annotates them.
pub trait Hub: Component {
    /// Returns `None` when the event is rejected.
    fn process_event(
        &mut self,
        event: Event,
        tracker_id: TrackerId,
        ctx: &mut HubContext<'_>,
    ) -> Option<Event>;
}

/// Derives metrics from an accepted, annotated event.
pub trait Metricalc: Component {
    fn process_metric(&mut self, event: &Event, tracker: &dyn Tracker) -> Vec<Metric>;
}

/// Sink for the annotated event stream and its metrics.
pub trait Backend: Component {
    fn send_event(&mut self, event: Event);

    fn send_metric(&mut self, metric: Metric);

    /// Push out anything held back. Most backends hold nothing.
    fn flush(&mut self) {}
}

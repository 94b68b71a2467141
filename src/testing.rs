//! Minimal tracker for unit tests that only need a state slot.

use crate::component::Tracker;
use crate::model::{State, TrackerId};

#[derive(Debug, Default)]
pub(crate) struct StubTracker {
    id: Option<TrackerId>,
    state: State,
}

impl Tracker for StubTracker {
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
}

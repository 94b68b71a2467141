use serde::{Deserialize, Serialize};

/// Playback flags for one tracked player.
///
/// Owned by the tracker, mutated only by the hub while it processes an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub did_media_request: bool,
    pub did_player_set: bool,
    pub did_stream_load: bool,
    pub did_start: bool,
    pub is_buffering: bool,
    pub is_paused: bool,
    pub is_seeking: bool,
    pub did_finish: bool,
    pub in_ad_break: bool,
    pub in_ad: bool,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every flag.
    pub fn reset(&mut self) {
        *self = State::default();
    }

    /// Clear the start-sequence flags so a finished tracker can report
    /// another playback of the same stream.
    pub fn restart_playback(&mut self) {
        self.did_start = false;
        self.is_paused = false;
        self.is_buffering = false;
        self.is_seeking = false;
        self.did_finish = false;
    }

    /// Started, not finished, and neither paused, seeking nor buffering.
    pub fn is_playing(&self) -> bool {
        self.did_start && !self.did_finish && !self.is_paused && !self.is_seeking && !self.is_buffering
    }
}

use std::time::{Duration, Instant};

use tracing::debug;

use crate::component::{Component, Hub};
use crate::config::InstrumentConfig;
use crate::instrument::ping::DEFAULT_PING_INTERVAL;
use crate::instrument::HubContext;
use crate::model::{Action, Attribute, Event, State, TrackerId};

/// What an accepted action asks of the ping timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Rejected,
    Accepted,
    /// Accepted `Start`: arm the keep-alive.
    Started,
    /// Accepted `End`/`Stop`/`Next`: cancel the keep-alive.
    Finished,
}

/// Playback state machine for content players.
///
/// Counters, accumulators and ids are hub-wide, shared by every tracker the
/// hub serves.
#[derive(Debug)]
pub struct HubCore {
    count_errors: u64,
    count_starts: u64,
    accum_pause_time: u64,
    accum_seek_time: u64,
    accum_buffer_time: u64,
    /// Pause/seek membership captured at `BufferBegin`, reported by the
    /// matching `BufferFinish`. One buffering span per tracker at a time.
    buffer_began_in_pause: bool,
    buffer_began_in_seek: bool,
    stream_id: Option<String>,
    playback_id: Option<String>,
    last_accepted_at: Option<Instant>,
    ping_interval: Duration,
}

impl Default for HubCore {
    fn default() -> Self {
        Self::new()
    }
}

impl HubCore {
    pub fn new() -> Self {
        Self {
            count_errors: 0,
            count_starts: 0,
            accum_pause_time: 0,
            accum_seek_time: 0,
            accum_buffer_time: 0,
            buffer_began_in_pause: false,
            buffer_began_in_seek: false,
            stream_id: None,
            playback_id: None,
            last_accepted_at: None,
            ping_interval: DEFAULT_PING_INTERVAL,
        }
    }

    pub fn from_config(config: &InstrumentConfig) -> Self {
        Self::new().with_ping_interval(config.ping_interval())
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn ping_interval(&self) -> Duration {
        self.ping_interval
    }

    pub fn count_errors(&self) -> u64 {
        self.count_errors
    }

    pub fn count_starts(&self) -> u64 {
        self.count_starts
    }

    pub fn accum_pause_time(&self) -> u64 {
        self.accum_pause_time
    }

    pub fn accum_seek_time(&self) -> u64 {
        self.accum_seek_time
    }

    pub fn accum_buffer_time(&self) -> u64 {
        self.accum_buffer_time
    }

    pub fn stream_id(&self) -> Option<&str> {
        self.stream_id.as_deref()
    }

    pub fn playback_id(&self) -> Option<&str> {
        self.playback_id.as_deref()
    }

    /// Check the action against the tracker state and apply it.
    fn accept_or_reject(&mut self, event: &Event, state: &mut State) -> Transition {
        let action = event.action();
        let elapsed = |begin: &Action| event.get_u64(&begin.time_since_attribute()).unwrap_or(0);

        if *action == Action::MEDIA_REQUEST {
            guard(&mut state.did_media_request)
        } else if *action == Action::PLAYER_SET {
            guard(&mut state.did_player_set)
        } else if *action == Action::STREAM_LOAD {
            let t = guard(&mut state.did_stream_load);
            if t == Transition::Accepted {
                self.stream_id = Some(new_id());
            }
            t
        } else if *action == Action::START {
            if state.did_start {
                return Transition::Rejected;
            }
            state.did_start = true;
            self.count_starts += 1;
            Transition::Started
        } else if *action == Action::PAUSE_BEGIN {
            if !state.did_start || state.is_paused {
                return Transition::Rejected;
            }
            state.is_paused = true;
            Transition::Accepted
        } else if *action == Action::PAUSE_FINISH {
            if !state.did_start || !state.is_paused {
                return Transition::Rejected;
            }
            state.is_paused = false;
            self.accum_pause_time += elapsed(&Action::PAUSE_BEGIN);
            Transition::Accepted
        } else if *action == Action::BUFFER_BEGIN {
            let t = guard(&mut state.is_buffering);
            if t == Transition::Accepted {
                self.buffer_began_in_pause = state.is_paused;
                self.buffer_began_in_seek = state.is_seeking;
            }
            t
        } else if *action == Action::BUFFER_FINISH {
            if !state.is_buffering {
                return Transition::Rejected;
            }
            state.is_buffering = false;
            self.accum_buffer_time += elapsed(&Action::BUFFER_BEGIN);
            Transition::Accepted
        } else if *action == Action::SEEK_BEGIN {
            guard(&mut state.is_seeking)
        } else if *action == Action::SEEK_FINISH {
            if !state.is_seeking {
                return Transition::Rejected;
            }
            state.is_seeking = false;
            self.accum_seek_time += elapsed(&Action::SEEK_BEGIN);
            Transition::Accepted
        } else if action.is_terminal() {
            if !state.did_start || state.did_finish {
                return Transition::Rejected;
            }
            state.did_finish = true;
            Transition::Finished
        } else {
            if *action == Action::ERROR {
                self.count_errors += 1;
            }
            Transition::Accepted
        }
    }

    fn stamp(&self, event: &mut Event, state: &State) {
        event.set(Attribute::COUNT_ERRORS, self.count_errors);
        event.set(Attribute::COUNT_STARTS, self.count_starts);
        event.set(Attribute::ACCUM_PAUSE_TIME, self.accum_pause_time);
        event.set(Attribute::ACCUM_BUFFER_TIME, self.accum_buffer_time);
        event.set(Attribute::ACCUM_SEEK_TIME, self.accum_seek_time);
        // a BufferFinish belongs to the block its BufferBegin started in
        if *event.action() == Action::BUFFER_FINISH {
            event.set(Attribute::IN_PAUSE_BLOCK, self.buffer_began_in_pause);
            event.set(Attribute::IN_SEEK_BLOCK, self.buffer_began_in_seek);
        } else {
            event.set(Attribute::IN_PAUSE_BLOCK, state.is_paused);
            event.set(Attribute::IN_SEEK_BLOCK, state.is_seeking);
        }
        event.set(Attribute::IN_BUFFER_BLOCK, state.is_buffering);
        event.set(Attribute::IN_PLAYBACK_BLOCK, state.did_start && !state.did_finish);
        if let Some(stream_id) = &self.stream_id {
            event.set(Attribute::STREAM_ID, stream_id.clone());
        }
        if let Some(playback_id) = &self.playback_id {
            event.set(Attribute::PLAYBACK_ID, playback_id.clone());
        }
    }
}

/// Set a one-shot flag, rejecting if it is already set.
fn guard(flag: &mut bool) -> Transition {
    if *flag {
        Transition::Rejected
    } else {
        *flag = true;
        Transition::Accepted
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Component for HubCore {
    fn instrument_ready(&mut self, instrument_id: &str) {
        debug!(target: "playback_telemetry::hub", instrument = instrument_id, "hub ready");
    }
}

impl Hub for HubCore {
    fn process_event(
        &mut self,
        mut event: Event,
        tracker_id: TrackerId,
        ctx: &mut HubContext<'_>,
    ) -> Option<Event> {
        let now = Instant::now();
        let Some(state) = ctx.state_mut(tracker_id) else {
            debug!(target: "playback_telemetry::hub", tracker = %tracker_id, "no state for tracker");
            return None;
        };

        // same stream played again after it finished
        if state.did_finish {
            state.restart_playback();
        }

        let action = event.action().clone();
        if (action == Action::MEDIA_REQUEST || action == Action::STREAM_LOAD) && self.playback_id.is_none() {
            self.playback_id = Some(new_id());
        }

        if state.is_playing() {
            if let Some(last) = self.last_accepted_at {
                event.set(Attribute::DELTA_PLAY_TIME, now.duration_since(last).as_millis() as u64);
            }
        }

        let transition = self.accept_or_reject(&event, state);
        let snapshot = *state;
        match transition {
            Transition::Rejected => {
                debug!(target: "playback_telemetry::hub", %action, tracker = %tracker_id, "rejected");
                return None;
            }
            Transition::Started => ctx.start_ping(tracker_id, self.ping_interval),
            Transition::Finished => ctx.stop_ping(tracker_id),
            Transition::Accepted => {}
        }

        self.last_accepted_at = Some(now);
        self.stamp(&mut event, &snapshot);

        if action.is_terminal() {
            self.playback_id = Some(new_id());
        }
        Some(event)
    }
}

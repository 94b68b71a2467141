//! # Metric calculator
//!
//! ## Responsibility
//! Derive quality metrics from events the hub has already accepted and
//! annotated. Stateless: every metric comes from attributes on the event.
//!
//! ## Guarantees
//! - A rebuffer is only counted when the buffering span started during real
//!   playback, outside any pause or seek.
//! - `PlayTime` is emitted for any event carrying `deltaPlayTime`.
//!
//! ## NOT Responsible For
//! - Aggregation or sampling (see [`crate::backend::SamplingBackend`])

use serde_json::Value;

use crate::component::{Component, Metricalc, Tracker};
use crate::model::{Action, Attribute, Event, Metric};

#[derive(Debug, Default, Clone, Copy)]
pub struct MetricalcCore;

impl MetricalcCore {
    pub fn new() -> Self {
        Self
    }

    fn counts_as_rebuffer(event: &Event) -> bool {
        let flags = (
            event.get_bool(&Attribute::IN_PLAYBACK_BLOCK),
            event.get_bool(&Attribute::IN_PAUSE_BLOCK),
            event.get_bool(&Attribute::IN_SEEK_BLOCK),
        );
        matches!(flags, (Some(true), Some(false), Some(false)))
    }
}

fn number(event: &Event, attribute: &Attribute) -> Option<f64> {
    event.get(attribute).and_then(Value::as_f64)
}

impl Component for MetricalcCore {}

impl Metricalc for MetricalcCore {
    fn process_metric(&mut self, event: &Event, _tracker: &dyn Tracker) -> Vec<Metric> {
        let mut metrics = Vec::new();
        let action = event.action();

        if *action == Action::START {
            let since_request = number(event, &Action::MEDIA_REQUEST.time_since_attribute());
            let since_load = number(event, &Action::STREAM_LOAD.time_since_attribute());
            if let Some(start_time) = since_request.or(since_load) {
                metrics.push(Metric::start_time(start_time));
            }
            metrics.push(Metric::num_plays(1.0));
        } else if *action == Action::BUFFER_FINISH {
            if Self::counts_as_rebuffer(event) {
                if let Some(elapsed) = number(event, &Action::BUFFER_BEGIN.time_since_attribute()) {
                    metrics.push(Metric::rebuffer_time(elapsed));
                    metrics.push(Metric::num_rebuffers(1.0));
                }
            }
        } else if *action == Action::MEDIA_REQUEST {
            metrics.push(Metric::num_requests(1.0));
        } else if *action == Action::STREAM_LOAD {
            metrics.push(Metric::num_loads(1.0));
        } else if action.is_terminal() {
            metrics.push(Metric::num_ends(1.0));
        }

        if let Some(delta) = number(event, &Attribute::DELTA_PLAY_TIME) {
            metrics.push(Metric::play_time(delta));
        }
        metrics
    }
}

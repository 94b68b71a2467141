use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::HubCore;
use crate::component::{Component, Hub};
use crate::config::InstrumentConfig;
use crate::instrument::HubContext;
use crate::model::{Action, Attribute, Event, TrackerId};

/// [`HubCore`] plus ad-break and ad sub-states.
///
/// Ad state is instrument-wide: the flags are written on every registered
/// tracker, so a content tracker knows when a separate ads tracker is inside
/// a break.
#[derive(Debug, Default)]
pub struct HubCoreAds {
    core: HubCore,
    count_ads: u64,
}

impl HubCoreAds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &InstrumentConfig) -> Self {
        Self::with_core(HubCore::from_config(config))
    }

    pub fn with_core(core: HubCore) -> Self {
        Self { core, count_ads: 0 }
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.core = self.core.with_ping_interval(interval);
        self
    }

    pub fn core(&self) -> &HubCore {
        &self.core
    }

    pub fn count_ads(&self) -> u64 {
        self.count_ads
    }

    /// Returns `false` if the action must be dropped.
    fn apply_ad_action(&mut self, action: &Action, tracker_id: TrackerId, ctx: &mut HubContext<'_>) -> bool {
        let Some(state) = ctx.state(tracker_id).copied() else {
            return false;
        };

        if *action == Action::AD_BREAK_BEGIN || *action == Action::AD_BREAK_FINISH {
            let entering = *action == Action::AD_BREAK_BEGIN;
            if state.in_ad_break == entering {
                return false;
            }
            ctx.for_each_state(|_, s| s.in_ad_break = entering);
        } else if *action == Action::AD_BEGIN || *action == Action::AD_FINISH {
            let entering = *action == Action::AD_BEGIN;
            if state.in_ad == entering {
                return false;
            }
            if entering {
                ctx.start_ping(tracker_id, self.core.ping_interval());
                self.count_ads += 1;
            } else {
                ctx.stop_ping(tracker_id);
            }
            ctx.for_each_state(|_, s| s.in_ad = entering);
        } else if *action == Action::END {
            // an ad break is not the end of the content
            if state.in_ad_break {
                return false;
            }
        } else if *action == Action::AD_PAUSE_BEGIN || *action == Action::AD_PAUSE_FINISH {
            let entering = *action == Action::AD_PAUSE_BEGIN;
            if state.is_paused == entering {
                return false;
            }
            if let Some(s) = ctx.state_mut(tracker_id) {
                s.is_paused = entering;
            }
        }
        true
    }

    /// First tracker, by id, whose `isAdsTracker` getter reports `false`.
    fn content_tracker(ctx: &HubContext<'_>) -> Option<TrackerId> {
        ctx.tracker_ids()
            .into_iter()
            .find(|id| ctx.call_getter(&Attribute::IS_ADS_TRACKER, *id) == Some(Value::Bool(false)))
    }
}

impl Component for HubCoreAds {
    fn instrument_ready(&mut self, instrument_id: &str) {
        self.core.instrument_ready(instrument_id);
    }

    fn end_of_service(&mut self) {
        self.core.end_of_service();
    }
}

impl Hub for HubCoreAds {
    fn process_event(
        &mut self,
        mut event: Event,
        tracker_id: TrackerId,
        ctx: &mut HubContext<'_>,
    ) -> Option<Event> {
        let action = event.action().clone();
        if !self.apply_ad_action(&action, tracker_id, ctx) {
            debug!(target: "playback_telemetry::hub", %action, tracker = %tracker_id, "rejected by ad state");
            return None;
        }

        let state = ctx.state(tracker_id).copied()?;
        event.set(Attribute::IN_AD_BREAK_BLOCK, state.in_ad_break);
        event.set(Attribute::IN_AD_BLOCK, state.in_ad);
        event.set(Attribute::COUNT_ADS, self.count_ads);
        if let Some(content) = Self::content_tracker(ctx) {
            ctx.use_getter(&Attribute::POSITION, &mut event, content);
        }

        self.core.process_event(event, tracker_id, ctx)
    }
}

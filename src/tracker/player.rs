use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::component::Tracker;
use crate::instrument::TrackerContext;
use crate::model::{Action, Attribute, Event, State, TrackerId};

/// Last error reported by the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerError {
    pub description: String,
    pub code: Option<i64>,
    pub error_type: Option<String>,
}

/// Snapshot of a player's observable properties. Unknown values stay `None`
/// and are never stamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerInfo {
    pub position_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub resolution_height: Option<u32>,
    pub resolution_width: Option<u32>,
    /// 0 to 100.
    pub volume: Option<u32>,
    pub muted: Option<bool>,
    pub source: Option<String>,
    pub language: Option<String>,
    pub bitrate: Option<u64>,
    pub title: Option<String>,
    pub last_error: Option<PlayerError>,
}

/// Shared, host-side view of a [`PlayerInfo`].
#[derive(Debug, Clone, Default)]
pub struct PlayerHandle {
    info: Arc<Mutex<PlayerInfo>>,
}

impl PlayerHandle {
    pub fn new(info: PlayerInfo) -> Self {
        Self {
            info: Arc::new(Mutex::new(info)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlayerInfo> {
        self.info.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self, f: impl FnOnce(&mut PlayerInfo)) {
        f(&mut self.lock());
    }

    pub fn snapshot(&self) -> PlayerInfo {
        self.lock().clone()
    }

    pub fn set_position(&self, position_ms: u64) {
        self.lock().position_ms = Some(position_ms);
    }

    pub fn set_error(&self, error: PlayerError) {
        self.lock().last_error = Some(error);
    }

    fn read(&self, field: Field) -> Option<Value> {
        field(&self.lock())
    }
}

type Field = fn(&PlayerInfo) -> Option<Value>;

fn content_fields() -> Vec<(Attribute, Field)> {
    let fields: [(Attribute, Field); 10] = [
        (Attribute::POSITION, |i| i.position_ms.map(Value::from)),
        (Attribute::DURATION, |i| i.duration_ms.map(Value::from)),
        (Attribute::RESOLUTION_HEIGHT, |i| i.resolution_height.map(Value::from)),
        (Attribute::RESOLUTION_WIDTH, |i| i.resolution_width.map(Value::from)),
        (Attribute::VOLUME, |i| i.volume.map(Value::from)),
        (Attribute::IS_MUTED, |i| i.muted.map(Value::from)),
        (Attribute::SOURCE, |i| i.source.clone().map(Value::from)),
        (Attribute::LANGUAGE, |i| i.language.clone().map(Value::from)),
        (Attribute::BITRATE, |i| i.bitrate.map(Value::from)),
        (Attribute::TITLE, |i| i.title.clone().map(Value::from)),
    ];
    fields.into()
}

fn ad_fields() -> Vec<(Attribute, Field)> {
    let fields: [(Attribute, Field); 7] = [
        (Attribute::AD_POSITION, |i| i.position_ms.map(Value::from)),
        (Attribute::AD_DURATION, |i| i.duration_ms.map(Value::from)),
        (Attribute::AD_RESOLUTION_HEIGHT, |i| i.resolution_height.map(Value::from)),
        (Attribute::AD_RESOLUTION_WIDTH, |i| i.resolution_width.map(Value::from)),
        (Attribute::AD_VOLUME, |i| i.volume.map(Value::from)),
        (Attribute::AD_BITRATE, |i| i.bitrate.map(Value::from)),
        (Attribute::AD_TITLE, |i| i.title.clone().map(Value::from)),
    ];
    fields.into()
}

/// Tracker over a [`PlayerHandle`].
#[derive(Debug)]
pub struct PlayerTracker {
    tracker_id: Option<TrackerId>,
    state: State,
    target: String,
    is_ads: bool,
    player: PlayerHandle,
    ignored: HashSet<Action>,
    ready: bool,
}

impl PlayerTracker {
    /// Content tracker. `target` names the player (`trackerTarget`).
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            tracker_id: None,
            state: State::new(),
            target: target.into(),
            is_ads: false,
            player: PlayerHandle::default(),
            ignored: HashSet::new(),
            ready: false,
        }
    }

    /// Tracker for the ad stream. Reports `isAdsTracker = true` and the
    /// `ad*` attribute family.
    pub fn ads(target: impl Into<String>) -> Self {
        Self {
            is_ads: true,
            ..Self::new(target)
        }
    }

    pub fn with_player(mut self, player: PlayerHandle) -> Self {
        self.player = player;
        self
    }

    /// Veto every event for `action`.
    pub fn ignoring(mut self, action: Action) -> Self {
        self.ignored.insert(action);
        self
    }

    pub fn player(&self) -> PlayerHandle {
        self.player.clone()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_ads(&self) -> bool {
        self.is_ads
    }

    fn attach_error(&self, event: &mut Event) {
        let Some(error) = self.player.snapshot().last_error else {
            return;
        };
        event.set(Attribute::ERROR_DESCRIPTION, error.description);
        if let Some(code) = error.code {
            event.set(Attribute::ERROR_CODE, code);
        }
        if let Some(error_type) = error.error_type {
            event.set(Attribute::ERROR_TYPE, error_type);
        }
    }
}

impl Tracker for PlayerTracker {
    fn tracker_id(&self) -> Option<TrackerId> {
        self.tracker_id
    }

    fn set_tracker_id(&mut self, id: TrackerId) {
        self.tracker_id = Some(id);
    }

    fn state(&self) -> &State {
        &self.state
    }

    fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    fn init_event(&mut self, mut event: Event) -> Option<Event> {
        let action = event.action();
        if self.ignored.contains(action) {
            trace!(target: "playback_telemetry::tracker", %action, target_name = %self.target, "ignored action");
            return None;
        }
        if *action == Action::ERROR || *action == Action::AD_ERROR {
            self.attach_error(&mut event);
        }
        Some(event)
    }

    fn instrument_ready(&mut self, ctx: &mut TrackerContext<'_>) {
        if self.ready {
            return;
        }
        self.ready = true;

        let target = self.target.clone();
        ctx.register_getter(Attribute::TRACKER_TARGET, move || Some(Value::from(target.clone())));
        let is_ads = self.is_ads;
        ctx.register_getter(Attribute::IS_ADS_TRACKER, move || Some(Value::Bool(is_ads)));

        let fields = if self.is_ads { ad_fields() } else { content_fields() };
        for (attribute, field) in fields {
            let player = self.player.clone();
            ctx.register_getter(attribute, move || player.read(field));
        }

        debug!(target: "playback_telemetry::tracker", tracker = %ctx.tracker_id(), target_name = %self.target, ads = self.is_ads, "tracker ready");
        ctx.emit(Action::TRACKER_INIT);
    }

    fn end_of_service(&mut self) {
        self.ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::GetterRegistry;

    const T0: TrackerId = TrackerId(0);

    fn ready(tracker: &mut PlayerTracker, getters: &mut GetterRegistry) -> Vec<Action> {
        let mut ctx = TrackerContext::new(T0, "inst", getters);
        tracker.instrument_ready(&mut ctx);
        ctx.into_pending()
    }

    // ===== getters =====

    #[test]
    fn test_content_getters_follow_handle() {
        let mut tracker = PlayerTracker::new("html5");
        let player = tracker.player();
        let mut getters = GetterRegistry::new();
        ready(&mut tracker, &mut getters);

        assert_eq!(getters.call(&Attribute::POSITION, T0), None);
        player.set_position(12_500);
        assert_eq!(getters.call(&Attribute::POSITION, T0), Some(Value::from(12_500u64)));
        assert_eq!(getters.call(&Attribute::TRACKER_TARGET, T0), Some(Value::from("html5")));
        assert_eq!(getters.call(&Attribute::IS_ADS_TRACKER, T0), Some(Value::Bool(false)));
        assert_eq!(getters.call(&Attribute::AD_POSITION, T0), None);
    }

    #[test]
    fn test_ads_tracker_uses_ad_attributes() {
        let mut tracker = PlayerTracker::ads("ima");
        tracker.player().update(|i| {
            i.position_ms = Some(3_000);
            i.title = Some("Spot".into());
        });
        let mut getters = GetterRegistry::new();
        ready(&mut tracker, &mut getters);

        assert_eq!(getters.call(&Attribute::AD_POSITION, T0), Some(Value::from(3_000u64)));
        assert_eq!(getters.call(&Attribute::AD_TITLE, T0), Some(Value::from("Spot")));
        assert_eq!(getters.call(&Attribute::POSITION, T0), None);
        assert_eq!(getters.call(&Attribute::IS_ADS_TRACKER, T0), Some(Value::Bool(true)));
    }

    // ===== lifecycle =====

    #[test]
    fn test_tracker_init_queued_once() {
        let mut tracker = PlayerTracker::new("html5");
        let mut getters = GetterRegistry::new();
        assert_eq!(ready(&mut tracker, &mut getters), vec![Action::TRACKER_INIT]);
        assert!(ready(&mut tracker, &mut getters).is_empty());
    }

    // ===== init_event =====

    #[test]
    fn test_error_attributes_attached() {
        let mut tracker = PlayerTracker::new("html5");
        tracker.player().set_error(PlayerError {
            description: "decode failed".into(),
            code: Some(3),
            error_type: Some("media".into()),
        });
        let event = tracker.init_event(Event::new(Action::ERROR)).unwrap();
        assert_eq!(event.get_str(&Attribute::ERROR_DESCRIPTION), Some("decode failed"));
        assert_eq!(event.get_u64(&Attribute::ERROR_CODE), Some(3));
        assert_eq!(event.get_str(&Attribute::ERROR_TYPE), Some("media"));
    }

    #[test]
    fn test_error_without_details_passes() {
        let mut tracker = PlayerTracker::new("html5");
        let event = tracker.init_event(Event::new(Action::ERROR)).unwrap();
        assert!(!event.contains(&Attribute::ERROR_DESCRIPTION));
    }

    #[test]
    fn test_ignored_action_vetoed() {
        let mut tracker = PlayerTracker::new("html5").ignoring(Action::PING);
        assert!(tracker.init_event(Event::new(Action::PING)).is_none());
        assert!(tracker.init_event(Event::new(Action::START)).is_some());
    }
}

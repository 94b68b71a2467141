//! Action catalog.
//!
//! Each action implicitly owns a companion attribute, `timeSince<Name>`, under
//! which the instrument stamps the elapsed milliseconds since that action was
//! last delivered.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::Attribute;

/// A named kind of playback lifecycle occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Action(Cow::Owned(name.into()))
    }

    pub const fn from_static(name: &'static str) -> Self {
        Action(Cow::Borrowed(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The `timeSince<Name>` attribute for this action.
    pub fn time_since_attribute(&self) -> Attribute {
        Attribute::new(format!("timeSince{}", self.0))
    }

    /// Look up a catalog action by name.
    pub fn from_name(name: &str) -> Option<Action> {
        ACTION_INDEX.get(name).cloned()
    }

    /// `End`, `Stop` or `Next`: the actions that close a playback session.
    pub fn is_terminal(&self) -> bool {
        *self == Action::END || *self == Action::STOP || *self == Action::NEXT
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! action_catalog {
    ($( $(#[$doc:meta])* $konst:ident => $name:literal ),* $(,)?) => {
        impl Action {
            $( $(#[$doc])* pub const $konst: Action = Action::from_static($name); )*

            /// Every well-known action.
            pub const CATALOG: &'static [Action] = &[ $( Action::$konst ),* ];
        }
    };
}

action_catalog! {
    /// A tracker was started.
    TRACKER_INIT => "TrackerInit",
    /// An audio/video stream was requested.
    MEDIA_REQUEST => "MediaRequest",
    /// A player instance was handed to the tracker.
    PLAYER_SET => "PlayerSet",
    PLAYER_READY => "PlayerReady",
    PREPARE_ITEM => "PrepareItem",
    MANIFEST_LOAD => "ManifestLoad",
    STREAM_LOAD => "StreamLoad",
    /// The stream started playing.
    START => "Start",
    BUFFER_BEGIN => "BufferBegin",
    BUFFER_FINISH => "BufferFinish",
    SEEK_BEGIN => "SeekBegin",
    SEEK_FINISH => "SeekFinish",
    PAUSE_BEGIN => "PauseBegin",
    PAUSE_FINISH => "PauseFinish",
    FORWARD_BEGIN => "ForwardBegin",
    FORWARD_FINISH => "ForwardFinish",
    REWIND_BEGIN => "RewindBegin",
    REWIND_FINISH => "RewindFinish",
    QUALITY_CHANGE_UP => "QualityChangeUp",
    QUALITY_CHANGE_DOWN => "QualityChangeDown",
    /// The user stopped the stream.
    STOP => "Stop",
    /// The stream reached its end.
    END => "End",
    /// A playlist moved on to its next item.
    NEXT => "Next",
    ERROR => "Error",
    /// Periodic keep-alive.
    PING => "Ping",
    AD_BREAK_BEGIN => "AdBreakBegin",
    AD_BREAK_FINISH => "AdBreakFinish",
    AD_BEGIN => "AdBegin",
    AD_FINISH => "AdFinish",
    AD_PAUSE_BEGIN => "AdPauseBegin",
    AD_PAUSE_FINISH => "AdPauseFinish",
    AD_BUFFER_BEGIN => "AdBufferBegin",
    AD_BUFFER_FINISH => "AdBufferFinish",
    AD_SKIP => "AdSkip",
    AD_CLICK => "AdClick",
    AD_FIRST_QUARTILE => "AdFirstQuartile",
    AD_SECOND_QUARTILE => "AdSecondQuartile",
    AD_THIRD_QUARTILE => "AdThirdQuartile",
    AD_ERROR => "AdError",
}

static ACTION_INDEX: Lazy<HashMap<String, Action>> = Lazy::new(|| {
    Action::CATALOG
        .iter()
        .map(|a| (a.name().to_string(), a.clone()))
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_since_attribute_name() {
        assert_eq!(
            Action::PAUSE_BEGIN.time_since_attribute().name(),
            "timeSincePauseBegin"
        );
    }

    #[test]
    fn test_time_since_attribute_is_stable_across_instances() {
        let a = Action::new("BufferBegin").time_since_attribute();
        let b = Action::BUFFER_BEGIN.time_since_attribute();
        assert_eq!(a, b);
    }

    #[test]
    fn test_action_from_name() {
        assert_eq!(Action::from_name("AdBreakBegin"), Some(Action::AD_BREAK_BEGIN));
        assert!(Action::from_name("Rewind").is_none());
    }

    #[test]
    fn test_terminal_actions() {
        assert!(Action::END.is_terminal());
        assert!(Action::STOP.is_terminal());
        assert!(Action::NEXT.is_terminal());
        assert!(!Action::AD_FINISH.is_terminal());
    }

    #[test]
    fn test_catalog_contains_ad_family() {
        let ads = Action::CATALOG.iter().filter(|a| a.name().starts_with("Ad")).count();
        assert_eq!(ads, 14);
    }
}

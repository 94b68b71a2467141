//! Attribute catalog.
//!
//! An [`Attribute`] is nothing more than a name. Two attributes with the same
//! name are the same key, whether they come from the catalog or were built
//! at runtime with [`Attribute::new`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A named field attachable to an [`Event`](super::Event).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attribute(Cow<'static, str>);

impl Attribute {
    /// Build an attribute from any name.
    pub fn new(name: impl Into<String>) -> Self {
        Attribute(Cow::Owned(name.into()))
    }

    pub const fn from_static(name: &'static str) -> Self {
        Attribute(Cow::Borrowed(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// An attribute with an empty name cannot be used as a key. Maps skip it.
    pub fn is_usable(&self) -> bool {
        !self.0.is_empty()
    }

    /// Look up a catalog attribute by name.
    pub fn from_name(name: &str) -> Option<Attribute> {
        ATTRIBUTE_INDEX.get(name).cloned()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Attribute {
    fn from(name: &str) -> Self {
        Attribute::new(name)
    }
}

macro_rules! attribute_catalog {
    ($( $(#[$doc:meta])* $konst:ident => $name:literal ),* $(,)?) => {
        impl Attribute {
            $( $(#[$doc])* pub const $konst: Attribute = Attribute::from_static($name); )*

            /// Every well-known attribute.
            pub const CATALOG: &'static [Attribute] = &[ $( Attribute::$konst ),* ];
        }
    };
}

attribute_catalog! {
    /// Target of the tracker (player SDK name).
    TRACKER_TARGET => "trackerTarget",
    /// Identifier of the stream being played.
    STREAM_ID => "streamId",
    /// Identifier of the current playback session.
    PLAYBACK_ID => "playbackId",
    /// `<instrumentId>-<trackerId>`.
    SENDER_ID => "senderId",
    COUNT_ERRORS => "countErrors",
    COUNT_STARTS => "countStarts",
    ACCUM_PAUSE_TIME => "accumPauseTime",
    ACCUM_BUFFER_TIME => "accumBufferTime",
    ACCUM_SEEK_TIME => "accumSeekTime",
    ACCUM_PLAY_TIME => "accumPlayTime",
    /// Time playing since the last accepted event, in milliseconds.
    DELTA_PLAY_TIME => "deltaPlayTime",
    IN_PAUSE_BLOCK => "inPauseBlock",
    IN_SEEK_BLOCK => "inSeekBlock",
    IN_BUFFER_BLOCK => "inBufferBlock",
    IN_PLAYBACK_BLOCK => "inPlaybackBlock",
    ERROR_DESCRIPTION => "errorDescription",
    ERROR_TYPE => "errorType",
    ERROR_CODE => "errorCode",
    /// Current stream position, in milliseconds.
    POSITION => "position",
    DURATION => "duration",
    RESOLUTION_HEIGHT => "resolutionHeight",
    RESOLUTION_WIDTH => "resolutionWidth",
    IS_MUTED => "isMuted",
    VOLUME => "volume",
    FPS => "fps",
    SOURCE => "source",
    BITRATE => "bitrate",
    LANGUAGE => "language",
    SUBTITLES => "subtitles",
    TITLE => "title",
    /// Whether the tracker reports ad events.
    IS_ADS_TRACKER => "isAdsTracker",
    COUNT_ADS => "countAds",
    IN_AD_BREAK_BLOCK => "inAdBreakBlock",
    IN_AD_BLOCK => "inAdBlock",
    AD_POSITION => "adPosition",
    AD_DURATION => "adDuration",
    AD_BUFFERED_TIME => "adBufferedTime",
    AD_VOLUME => "adVolume",
    /// pre, mid or post roll.
    AD_ROLL => "adRoll",
    AD_DESCRIPTION => "adDescription",
    AD_ID => "adId",
    AD_TITLE => "adTitle",
    AD_ADVERTISER_NAME => "adAdvertiserName",
    AD_CREATIVE_ID => "adCreativeId",
    AD_BITRATE => "adBitrate",
    AD_RESOLUTION_HEIGHT => "adResolutionHeight",
    AD_RESOLUTION_WIDTH => "adResolutionWidth",
    AD_SYSTEM => "adSystem",
    /// Ad provider (ima, freewheel, vast, ...).
    AD_CLIENT => "adClient",
}

static ATTRIBUTE_INDEX: Lazy<HashMap<String, Attribute>> = Lazy::new(|| {
    Attribute::CATALOG
        .iter()
        .map(|a| (a.name().to_string(), a.clone()))
        .collect()
});

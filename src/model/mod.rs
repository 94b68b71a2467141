//! # Data model
//!
//! Time-stamped value objects ([`Event`], [`Metric`]), the identity-by-name
//! catalogs ([`Action`], [`Attribute`]) and the per-tracker [`State`] flags.

mod action;
mod attribute;
mod event;
mod metric;
mod sample;
mod state;

pub use action::Action;
pub use attribute::Attribute;
pub use event::Event;
pub use metric::{Metric, MetricType};
pub use sample::{now_ms, Sample};
pub use state::State;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier the instrument assigns to a tracker. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackerId(pub u32);

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

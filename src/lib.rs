//! Vendor-neutral playback telemetry.
//!
//! Player adapters ([`Tracker`]s) report catalog [`Action`]s to an
//! [`Instrument`]. The instrument builds an [`Event`], lets the tracker
//! enrich or veto it, runs it through a [`Hub`] state machine, derives
//! [`Metric`]s with a [`Metricalc`] and hands both to a [`Backend`].
//!
//! ```no_run
//! use playback_telemetry::{
//!     backend::MemoryBackend, config::InstrumentConfig, hub::HubCore, metricalc::MetricalcCore,
//!     model::Action, tracker::PlayerTracker, Instrument,
//! };
//!
//! let backend = MemoryBackend::new();
//! let mut instrument = Instrument::new(&InstrumentConfig::default())
//!     .with_hub(HubCore::new())
//!     .with_metricalc(MetricalcCore::new())
//!     .with_backend(backend.clone());
//! let tracker = instrument.add_tracker(PlayerTracker::new("html5"));
//! instrument.ready();
//! instrument.emit(&Action::MEDIA_REQUEST, tracker);
//! instrument.emit(&Action::START, tracker);
//! assert_eq!(backend.metric_names(), vec!["NumRequests", "StartTime", "NumPlays"]);
//! ```

pub mod backend;
pub mod buffer;
pub mod cli;
pub mod component;
pub mod config;
pub mod error;
pub mod hub;
pub mod instrument;
pub mod logging;
pub mod metricalc;
pub mod model;
pub mod replay;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use component::{Backend, Component, Hub, Metricalc, Tracker};
pub use error::{Result, TelemetryError};
pub use instrument::{EmitOutcome, Instrument};
pub use model::{Action, Attribute, Event, Metric, MetricType, State, TrackerId};

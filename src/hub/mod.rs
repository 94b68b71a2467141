//! # Hubs
//!
//! ## Responsibility
//! Decide whether an event is consistent with its tracker's playback state,
//! apply the transition, and stamp the cross-cutting attributes (counters,
//! accumulated times, block membership, stream and playback ids).
//!
//! ## Guarantees
//! - A rejected action's own transition is never applied. A tracker that
//!   already finished is reset to a fresh session before the check runs.
//! - `Start` arms the tracker's keep-alive; `End`/`Stop`/`Next` cancel it.
//! - [`HubCoreAds`] runs its ad bookkeeping first and only then hands the
//!   event to the [`HubCore`] it wraps.
//!
//! ## NOT Responsible For
//! - Deriving metrics (see [`crate::metricalc`])
//! - Emitting pings (see [`crate::instrument::ping`])

mod ads;
mod core;

pub use self::ads::HubCoreAds;
pub use self::core::HubCore;

//! # Trackers
//!
//! ## Responsibility
//! Adapt a concrete player to the instrument: expose its live properties as
//! getters and translate its callbacks into catalog actions.
//!
//! [`PlayerTracker`] is player-agnostic. The host keeps a [`PlayerHandle`]
//! and writes the player's current properties into it; the tracker reads
//! them back whenever the hub asks for an attribute.
//!
//! ## NOT Responsible For
//! - Deciding whether an action is valid (hub)

mod player;

pub use player::{PlayerError, PlayerHandle, PlayerInfo, PlayerTracker};

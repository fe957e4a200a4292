//! Ephemeral voice room lifecycle for Voicekeeper.
//!
//! A member entering a configured lobby channel gets a fresh voice room
//! created for them; a room left empty beyond a grace period is deleted
//! again. The [`RoomKeeper`] owns both halves and the registry that ties
//! a live channel to its room metadata.
//!
//! # Key types
//!
//! - [`TriggerKind`] — which lobby a room was spawned from
//! - [`RoomTemplate`] / [`RoomsConfig`] — naming, capacity, category rules
//! - [`RoomRegistry`] — channel id → [`EphemeralRoom`] metadata
//! - [`RoomKeeper`] — provisions on lobby entry, reaps on vacancy

mod config;
mod error;
mod keeper;
mod registry;

pub use config::{RoomTemplate, RoomsConfig, TriggerKind};
pub use error::RoomError;
pub use keeper::RoomKeeper;
pub use registry::{EphemeralRoom, RoomRegistry};

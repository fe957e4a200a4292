//! Shared types for Voicekeeper's platform boundary.
//!
//! Everything the subsystem crates and the platform gateway agree on lives
//! here: identity newtypes for platform entities, voice presence change
//! events, and the [`Payload`] structure that rendered announcements are
//! expressed in before the gateway turns them into platform messages.

mod payload;
mod types;

pub use payload::{colors, Payload, PayloadField};
pub use types::{
    CategoryId, ChannelId, MemberId, MessageId, RoleId, VoiceState,
    VoiceUpdate,
};

//! The room registry: which live channels are ephemeral rooms.

use std::collections::HashMap;
use std::time::Instant;

use voicekeeper_protocol::{ChannelId, MemberId};

use crate::TriggerKind;

/// Metadata for one provisioned room. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct EphemeralRoom {
    pub channel: ChannelId,
    pub kind: TriggerKind,
    pub created_by: MemberId,
    pub created_at: Instant,
}

/// All currently-live ephemeral rooms, keyed by channel id.
///
/// An entry exists if and only if the channel was created by the keeper
/// and has not been deleted yet. The registry itself is plain data — the
/// keeper serializes access through a mutex at a higher level, the same
/// way the session registry is handled.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<ChannelId, EphemeralRoom>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly created room.
    pub fn insert(&mut self, room: EphemeralRoom) {
        tracing::info!(
            channel = %room.channel,
            kind = %room.kind,
            created_by = %room.created_by,
            "ephemeral room registered"
        );
        self.rooms.insert(room.channel, room);
    }

    /// Deregisters a room. Removing an absent entry is a no-op and
    /// returns `None` — racing reapers rely on this.
    pub fn remove(&mut self, channel: ChannelId) -> Option<EphemeralRoom> {
        let removed = self.rooms.remove(&channel);
        if removed.is_some() {
            tracing::info!(%channel, "ephemeral room deregistered");
        }
        removed
    }

    pub fn contains(&self, channel: ChannelId) -> bool {
        self.rooms.contains_key(&channel)
    }

    pub fn get(&self, channel: ChannelId) -> Option<&EphemeralRoom> {
        self.rooms.get(&channel)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

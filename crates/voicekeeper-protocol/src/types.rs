//! Identity newtypes and voice presence events.
//!
//! Every platform entity is addressed by a numeric snowflake. Each gets
//! its own newtype so a `RoleId` can never be passed where a `ChannelId`
//! is expected, even though both are `u64` underneath.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A platform member (user in a guild).
///
/// `#[serde(transparent)]` keeps the JSON representation a plain number,
/// matching the platform's own snowflake encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl MemberId {
    /// Platform mention markup for this member.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// A voice or text channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl ChannelId {
    /// Platform mention markup for this channel.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A channel category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cat-{}", self.0)
    }
}

/// A guild role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub u64);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role-{}", self.0)
    }
}

/// A posted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Voice presence
// ---------------------------------------------------------------------------

/// A member's voice presence at one point in time.
///
/// `channel: None` means the member is not in any voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceState {
    pub channel: Option<ChannelId>,
}

impl VoiceState {
    /// Presence inside the given channel.
    pub fn in_channel(channel: ChannelId) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// Presence outside any voice channel.
    pub fn disconnected() -> Self {
        Self { channel: None }
    }
}

/// A voice presence change delivered by the platform.
///
/// The platform fires one of these per transition: joining a channel,
/// leaving one, or moving between two (in which case both `before` and
/// `after` carry a channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceUpdate {
    pub member: MemberId,
    pub before: VoiceState,
    pub after: VoiceState,
}

impl VoiceUpdate {
    /// The channel the member left, if this update has a leave side.
    pub fn left(&self) -> Option<ChannelId> {
        match (self.before.channel, self.after.channel) {
            (Some(prev), next) if next != Some(prev) => Some(prev),
            _ => None,
        }
    }

    /// The channel the member entered, if this update has a join side.
    pub fn joined(&self) -> Option<ChannelId> {
        match (self.before.channel, self.after.channel) {
            (prev, Some(next)) if prev != Some(next) => Some(next),
            _ => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

//! The `Gateway` trait — everything the core consumes from the platform.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use voicekeeper_protocol::{
    CategoryId, ChannelId, MemberId, MessageId, Payload, RoleId,
};

use crate::GatewayError;

/// A snapshot of a voice channel and its current occupants.
///
/// Always re-resolved through [`Gateway::voice_channel`] before use —
/// channels are deleted out from under the bot all the time, and a
/// snapshot is stale the moment it is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceChannelInfo {
    pub id: ChannelId,
    pub name: String,
    /// Occupancy cap. 0 means unlimited.
    pub user_limit: u32,
    pub category: Option<CategoryId>,
    pub members: Vec<MemberId>,
}

/// Parameters for creating a voice channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVoiceChannel {
    pub name: String,
    /// Occupancy cap. 0 means unlimited.
    pub user_limit: u32,
    pub category: CategoryId,
}

/// A role's identity and hierarchy position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
    /// Position in the guild's role hierarchy. Higher outranks lower.
    pub position: u16,
}

/// The bot's own guild-level capabilities, reported at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub manage_roles: bool,
    pub manage_channels: bool,
    pub move_members: bool,
    pub manage_nicknames: bool,
}

impl Capabilities {
    /// Names of the capabilities that are missing, for the startup audit.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.manage_roles {
            out.push("manage_roles");
        }
        if !self.manage_channels {
            out.push("manage_channels");
        }
        if !self.move_members {
            out.push("move_members");
        }
        if !self.manage_nicknames {
            out.push("manage_nicknames");
        }
        out
    }
}

/// The platform capability boundary.
///
/// Implemented once per deployment against the real platform client, and
/// once in-tree by [`InMemoryGateway`](crate::InMemoryGateway) for tests.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` — the gateway is shared across the event
///   handlers and the reconciler task behind an `Arc`.
/// - Each method returns `impl Future<…> + Send` so generic callers can
///   be spawned onto the runtime.
pub trait Gateway: Send + Sync + 'static {
    /// Resolves a voice channel and its live occupant list.
    ///
    /// Returns an explicit [`GatewayError::NotFound`] for a deleted
    /// channel — callers must never assume continued existence.
    fn voice_channel(
        &self,
        id: ChannelId,
    ) -> impl Future<Output = Result<VoiceChannelInfo, GatewayError>> + Send;

    /// Lists all voice channels in the guild.
    fn voice_channels(
        &self,
    ) -> impl Future<Output = Result<Vec<VoiceChannelInfo>, GatewayError>> + Send;

    /// The voice channel a member currently occupies, if any.
    fn voice_channel_of(
        &self,
        member: MemberId,
    ) -> impl Future<Output = Result<Option<ChannelId>, GatewayError>> + Send;

    /// Finds a category by exact name.
    fn find_category(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<CategoryId>, GatewayError>> + Send;

    /// Creates a category with the given name.
    fn create_category(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<CategoryId, GatewayError>> + Send;

    /// Creates a voice channel.
    fn create_voice_channel(
        &self,
        req: NewVoiceChannel,
    ) -> impl Future<Output = Result<ChannelId, GatewayError>> + Send;

    /// Deletes a channel. `NotFound` means it was already gone.
    fn delete_channel(
        &self,
        id: ChannelId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Moves a member into a voice channel.
    fn move_member(
        &self,
        member: MemberId,
        channel: ChannelId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Resolves a role's hierarchy position.
    fn role(
        &self,
        id: RoleId,
    ) -> impl Future<Output = Result<RoleInfo, GatewayError>> + Send;

    /// The hierarchy position of the bot's own highest role.
    ///
    /// The core refuses to grant or revoke any role whose position is
    /// not strictly below this.
    fn top_role_position(
        &self,
    ) -> impl Future<Output = Result<u16, GatewayError>> + Send;

    /// Whether the member currently carries the role.
    fn member_has_role(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Grants a role to a member.
    fn add_role(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Revokes a role from a member.
    fn remove_role(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// The bot's own capability set, for the startup audit.
    fn capabilities(
        &self,
    ) -> impl Future<Output = Result<Capabilities, GatewayError>> + Send;

    /// Posts a payload to a text channel.
    fn post(
        &self,
        channel: ChannelId,
        payload: Payload,
    ) -> impl Future<Output = Result<MessageId, GatewayError>> + Send;

    /// Posts a payload that the platform auto-deletes after `ttl`.
    fn post_transient(
        &self,
        channel: ChannelId,
        payload: Payload,
        ttl: Duration,
    ) -> impl Future<Output = Result<MessageId, GatewayError>> + Send;

    /// Replaces the payload of an existing message.
    fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: Payload,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Deletes a message. `NotFound` means it was already gone.
    fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Sends a short reply only the acting member can see.
    fn respond_ephemeral(
        &self,
        member: MemberId,
        text: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Sends a direct message. Best-effort; callers log failures and
    /// move on.
    fn dm(
        &self,
        member: MemberId,
        payload: Payload,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_missing_lists_disabled_ones() {
        let caps = Capabilities {
            manage_roles: true,
            manage_channels: false,
            move_members: true,
            manage_nicknames: false,
        };
        assert_eq!(caps.missing(), vec!["manage_channels", "manage_nicknames"]);
    }

    #[test]
    fn test_capabilities_missing_empty_when_all_granted() {
        let caps = Capabilities {
            manage_roles: true,
            manage_channels: true,
            move_members: true,
            manage_nicknames: true,
        };
        assert!(caps.missing().is_empty());
    }
}

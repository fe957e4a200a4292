//! Bot configuration. Fixed at construction, not reloadable.

use serde::{Deserialize, Serialize};
use voicekeeper_protocol::{ChannelId, RoleId};
use voicekeeper_rooms::RoomsConfig;
use voicekeeper_search::SearchConfig;

/// Nickname verification settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Role granted to verified members.
    pub role: RoleId,
    /// Channel where verification happens.
    pub channel: ChannelId,
}

/// Leave-of-absence settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveConfig {
    /// Channel members file their requests in.
    pub request_channel: ChannelId,
    /// Channel the admin notifications go to.
    pub admin_channel: ChannelId,
    /// Role marking a member as on leave.
    pub role: RoleId,
}

/// Everything the coordinator needs, bundled.
///
/// `Default` wires placeholder ids — a deployment replaces every id with
/// its own guild's. Only the room templates carry meaningful defaults.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub rooms: RoomsConfig,
    pub search: SearchConfig,
    pub verification: VerificationConfig,
    pub leave: LeaveConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            rooms: RoomsConfig::default(),
            search: SearchConfig::new(ChannelId(0)),
            verification: VerificationConfig {
                role: RoleId(0),
                channel: ChannelId(0),
            },
            leave: LeaveConfig {
                request_channel: ChannelId(0),
                admin_channel: ChannelId(0),
                role: RoleId(0),
            },
        }
    }
}

//! A map-backed gateway for tests and local experiments.
//!
//! Models just enough of a guild — voice channels with occupant lists,
//! categories, roles, posted messages — for the core's behavior to be
//! exercised end to end without a platform connection. Capability flags
//! can be revoked to drive the permission-denied paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use tokio::sync::Mutex;
use voicekeeper_protocol::{
    CategoryId, ChannelId, MemberId, MessageId, Payload, RoleId,
};

use crate::{
    Capabilities, Gateway, GatewayError, NewVoiceChannel, RoleInfo,
    VoiceChannelInfo,
};

#[derive(Debug, Clone)]
struct ChannelRecord {
    name: String,
    user_limit: u32,
    category: Option<CategoryId>,
    members: Vec<MemberId>,
}

#[derive(Debug)]
struct State {
    next_id: u64,
    categories: HashMap<CategoryId, String>,
    channels: HashMap<ChannelId, ChannelRecord>,
    /// BTreeMap keeps messages in posting order (ids are monotonic).
    messages: BTreeMap<MessageId, (ChannelId, Payload)>,
    roles: HashMap<RoleId, RoleInfo>,
    member_roles: HashMap<MemberId, HashSet<RoleId>>,
    ephemeral: Vec<(MemberId, String)>,
    dms: Vec<(MemberId, Payload)>,
    caps: Capabilities,
    top_role_position: u16,
}

/// In-process [`Gateway`] backed by plain maps.
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    /// A gateway with every capability granted and an empty guild.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                categories: HashMap::new(),
                channels: HashMap::new(),
                messages: BTreeMap::new(),
                roles: HashMap::new(),
                member_roles: HashMap::new(),
                ephemeral: Vec::new(),
                dms: Vec::new(),
                caps: Capabilities {
                    manage_roles: true,
                    manage_channels: true,
                    move_members: true,
                    manage_nicknames: true,
                },
                top_role_position: 100,
            }),
        }
    }

    // -- Seeding -----------------------------------------------------------

    /// Adds a voice channel outside the provisioning path.
    pub async fn seed_voice_channel(
        &self,
        name: &str,
        user_limit: u32,
        category: Option<CategoryId>,
    ) -> ChannelId {
        let mut state = self.state.lock().await;
        let id = ChannelId(state.bump());
        state.channels.insert(
            id,
            ChannelRecord {
                name: name.to_owned(),
                user_limit,
                category,
                members: Vec::new(),
            },
        );
        id
    }

    /// Adds a category outside the provisioning path.
    pub async fn seed_category(&self, name: &str) -> CategoryId {
        let mut state = self.state.lock().await;
        let id = CategoryId(state.bump());
        state.categories.insert(id, name.to_owned());
        id
    }

    /// Adds a role with a caller-chosen id and hierarchy position.
    pub async fn seed_role(&self, id: RoleId, name: &str, position: u16) {
        let mut state = self.state.lock().await;
        state.roles.insert(
            id,
            RoleInfo {
                id,
                name: name.to_owned(),
                position,
            },
        );
    }

    /// Puts a member into a voice channel, leaving any previous one.
    pub async fn connect(&self, member: MemberId, channel: ChannelId) {
        let mut state = self.state.lock().await;
        state.remove_from_voice(member);
        if let Some(record) = state.channels.get_mut(&channel) {
            record.members.push(member);
        }
    }

    /// Removes a member from whatever voice channel they occupy.
    pub async fn disconnect(&self, member: MemberId) {
        let mut state = self.state.lock().await;
        state.remove_from_voice(member);
    }

    /// Replaces the capability set (for permission-denied tests).
    pub async fn set_capabilities(&self, caps: Capabilities) {
        self.state.lock().await.caps = caps;
    }

    /// Replaces the bot's top role position (for hierarchy tests).
    pub async fn set_top_role_position(&self, position: u16) {
        self.state.lock().await.top_role_position = position;
    }

    // -- Inspection --------------------------------------------------------

    /// Whether a channel still exists.
    pub async fn channel_exists(&self, id: ChannelId) -> bool {
        self.state.lock().await.channels.contains_key(&id)
    }

    /// All messages posted to a channel, oldest first.
    pub async fn messages_in(
        &self,
        channel: ChannelId,
    ) -> Vec<(MessageId, Payload)> {
        self.state
            .lock()
            .await
            .messages
            .iter()
            .filter(|(_, (ch, _))| *ch == channel)
            .map(|(id, (_, payload))| (*id, payload.clone()))
            .collect()
    }

    /// All ephemeral replies sent so far, in order.
    pub async fn ephemeral_replies(&self) -> Vec<(MemberId, String)> {
        self.state.lock().await.ephemeral.clone()
    }

    /// All direct messages sent to a member.
    pub async fn dms_to(&self, member: MemberId) -> Vec<Payload> {
        self.state
            .lock()
            .await
            .dms
            .iter()
            .filter(|(m, _)| *m == member)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl State {
    fn bump(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn remove_from_voice(&mut self, member: MemberId) {
        for record in self.channels.values_mut() {
            record.members.retain(|m| *m != member);
        }
    }

    fn info(&self, id: ChannelId) -> Option<VoiceChannelInfo> {
        self.channels.get(&id).map(|record| VoiceChannelInfo {
            id,
            name: record.name.clone(),
            user_limit: record.user_limit,
            category: record.category,
            members: record.members.clone(),
        })
    }
}

impl Gateway for InMemoryGateway {
    async fn voice_channel(
        &self,
        id: ChannelId,
    ) -> Result<VoiceChannelInfo, GatewayError> {
        self.state
            .lock()
            .await
            .info(id)
            .ok_or(GatewayError::not_found("channel", id.0))
    }

    async fn voice_channels(
        &self,
    ) -> Result<Vec<VoiceChannelInfo>, GatewayError> {
        let state = self.state.lock().await;
        let mut infos: Vec<VoiceChannelInfo> = state
            .channels
            .keys()
            .filter_map(|id| state.info(*id))
            .collect();
        infos.sort_by_key(|info| info.id.0);
        Ok(infos)
    }

    async fn voice_channel_of(
        &self,
        member: MemberId,
    ) -> Result<Option<ChannelId>, GatewayError> {
        let state = self.state.lock().await;
        Ok(state
            .channels
            .iter()
            .find(|(_, record)| record.members.contains(&member))
            .map(|(id, _)| *id))
    }

    async fn find_category(
        &self,
        name: &str,
    ) -> Result<Option<CategoryId>, GatewayError> {
        let state = self.state.lock().await;
        Ok(state
            .categories
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id))
    }

    async fn create_category(
        &self,
        name: &str,
    ) -> Result<CategoryId, GatewayError> {
        let mut state = self.state.lock().await;
        if !state.caps.manage_channels {
            return Err(GatewayError::Permission("manage_channels".into()));
        }
        let id = CategoryId(state.bump());
        state.categories.insert(id, name.to_owned());
        tracing::debug!(%id, name, "category created");
        Ok(id)
    }

    async fn create_voice_channel(
        &self,
        req: NewVoiceChannel,
    ) -> Result<ChannelId, GatewayError> {
        let mut state = self.state.lock().await;
        if !state.caps.manage_channels {
            return Err(GatewayError::Permission("manage_channels".into()));
        }
        if !state.categories.contains_key(&req.category) {
            return Err(GatewayError::not_found("category", req.category.0));
        }
        let id = ChannelId(state.bump());
        state.channels.insert(
            id,
            ChannelRecord {
                name: req.name,
                user_limit: req.user_limit,
                category: Some(req.category),
                members: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn delete_channel(&self, id: ChannelId) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        if !state.caps.manage_channels {
            return Err(GatewayError::Permission("manage_channels".into()));
        }
        state
            .channels
            .remove(&id)
            .map(|_| ())
            .ok_or(GatewayError::not_found("channel", id.0))
    }

    async fn move_member(
        &self,
        member: MemberId,
        channel: ChannelId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        if !state.caps.move_members {
            return Err(GatewayError::Permission("move_members".into()));
        }
        if !state.channels.contains_key(&channel) {
            return Err(GatewayError::not_found("channel", channel.0));
        }
        state.remove_from_voice(member);
        if let Some(record) = state.channels.get_mut(&channel) {
            record.members.push(member);
        }
        Ok(())
    }

    async fn role(&self, id: RoleId) -> Result<RoleInfo, GatewayError> {
        self.state
            .lock()
            .await
            .roles
            .get(&id)
            .cloned()
            .ok_or(GatewayError::not_found("role", id.0))
    }

    async fn top_role_position(&self) -> Result<u16, GatewayError> {
        Ok(self.state.lock().await.top_role_position)
    }

    async fn member_has_role(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> Result<bool, GatewayError> {
        let state = self.state.lock().await;
        Ok(state
            .member_roles
            .get(&member)
            .is_some_and(|roles| roles.contains(&role)))
    }

    async fn add_role(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        if !state.caps.manage_roles {
            return Err(GatewayError::Permission("manage_roles".into()));
        }
        if !state.roles.contains_key(&role) {
            return Err(GatewayError::not_found("role", role.0));
        }
        state.member_roles.entry(member).or_default().insert(role);
        Ok(())
    }

    async fn remove_role(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        if !state.caps.manage_roles {
            return Err(GatewayError::Permission("manage_roles".into()));
        }
        if let Some(roles) = state.member_roles.get_mut(&member) {
            roles.remove(&role);
        }
        Ok(())
    }

    async fn capabilities(&self) -> Result<Capabilities, GatewayError> {
        Ok(self.state.lock().await.caps)
    }

    async fn post(
        &self,
        channel: ChannelId,
        payload: Payload,
    ) -> Result<MessageId, GatewayError> {
        let mut state = self.state.lock().await;
        let id = MessageId(state.bump());
        state.messages.insert(id, (channel, payload));
        Ok(id)
    }

    async fn post_transient(
        &self,
        channel: ChannelId,
        payload: Payload,
        _ttl: Duration,
    ) -> Result<MessageId, GatewayError> {
        // The in-memory guild keeps transient messages around so tests
        // can assert on them; the ttl only matters on the real platform.
        self.post(channel, payload).await
    }

    async fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: Payload,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        match state.messages.get_mut(&message) {
            Some((ch, existing)) if *ch == channel => {
                *existing = payload;
                Ok(())
            }
            _ => Err(GatewayError::not_found("message", message.0)),
        }
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        let posted_here =
            matches!(state.messages.get(&message), Some((ch, _)) if *ch == channel);
        if posted_here {
            state.messages.remove(&message);
            Ok(())
        } else {
            Err(GatewayError::not_found("message", message.0))
        }
    }

    async fn respond_ephemeral(
        &self,
        member: MemberId,
        text: &str,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.ephemeral.push((member, text.to_owned()));
        Ok(())
    }

    async fn dm(
        &self,
        member: MemberId,
        payload: Payload,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().await;
        state.dms.push((member, payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicekeeper_protocol::colors;

    #[tokio::test]
    async fn test_voice_channel_not_found_after_delete() {
        let gw = InMemoryGateway::new();
        let ch = gw.seed_voice_channel("room", 2, None).await;

        gw.delete_channel(ch).await.unwrap();

        let err = gw.voice_channel(ch).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_channel_twice_reports_not_found() {
        let gw = InMemoryGateway::new();
        let ch = gw.seed_voice_channel("room", 2, None).await;

        gw.delete_channel(ch).await.unwrap();
        let err = gw.delete_channel(ch).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_move_member_switches_channels() {
        let gw = InMemoryGateway::new();
        let a = gw.seed_voice_channel("a", 0, None).await;
        let b = gw.seed_voice_channel("b", 0, None).await;
        let member = MemberId(1);

        gw.connect(member, a).await;
        gw.move_member(member, b).await.unwrap();

        assert_eq!(gw.voice_channel_of(member).await.unwrap(), Some(b));
        assert!(gw.voice_channel(a).await.unwrap().members.is_empty());
    }

    #[tokio::test]
    async fn test_revoked_capability_denies_channel_create() {
        let gw = InMemoryGateway::new();
        let cat = gw.seed_category("temp").await;
        gw.set_capabilities(Capabilities {
            manage_channels: false,
            manage_roles: true,
            move_members: true,
            manage_nicknames: true,
        })
        .await;

        let err = gw
            .create_voice_channel(NewVoiceChannel {
                name: "room".into(),
                user_limit: 2,
                category: cat,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Permission(_)));
    }

    #[tokio::test]
    async fn test_edit_replaces_payload_in_place() {
        let gw = InMemoryGateway::new();
        let channel = ChannelId(500);
        let first = Payload::new("one", colors::INFO);
        let second = Payload::new("two", colors::INFO);

        let msg = gw.post(channel, first).await.unwrap();
        gw.edit(channel, msg, second.clone()).await.unwrap();

        let messages = gw.messages_in(channel).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].1, second);
    }

    #[tokio::test]
    async fn test_role_grant_and_revoke_round_trip() {
        let gw = InMemoryGateway::new();
        let role = RoleId(77);
        gw.seed_role(role, "verified", 10).await;
        let member = MemberId(5);

        gw.add_role(member, role).await.unwrap();
        assert!(gw.member_has_role(member, role).await.unwrap());

        gw.remove_role(member, role).await.unwrap();
        assert!(!gw.member_has_role(member, role).await.unwrap());
    }
}

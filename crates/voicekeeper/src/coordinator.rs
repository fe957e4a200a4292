//! The coordinator: owns the registries and fans platform events out to
//! the subsystems.
//!
//! Nothing in here is fatal — every entry point resolves user-facing
//! conditions into posted messages and logs the rest, keeping the event
//! loop alive for the next event.

use std::sync::Arc;

use tokio::sync::Mutex;
use voicekeeper_gateway::{Gateway, GatewayError};
use voicekeeper_protocol::{MemberId, MessageId, RoleId, VoiceUpdate};
use voicekeeper_rooms::RoomKeeper;
use voicekeeper_search::{
    spawn_reconciler, ReconcilerHandle, SearchError, SearchService,
};

use crate::{
    BotConfig, CooldownMap, LeaveBook, LeaveRecord, VerifiedRegistry,
};

/// The interactive controls attached to a search announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    Join,
    Leave,
    Cancel,
}

impl SearchControl {
    /// Control identifier as registered with the platform.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Join => "search:join",
            Self::Leave => "search:leave",
            Self::Cancel => "search:cancel",
        }
    }

    /// Parses a control identifier from an activation event.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "search:join" => Some(Self::Join),
            "search:leave" => Some(Self::Leave),
            "search:cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Top-level bot state: the gateway, both stateful subsystems, and the
/// ambient books. One per process.
pub struct Coordinator<G: Gateway> {
    pub(crate) gateway: Arc<G>,
    pub(crate) config: BotConfig,
    pub(crate) rooms: RoomKeeper<G>,
    pub(crate) search: Arc<SearchService<G>>,
    pub(crate) verified: Mutex<VerifiedRegistry>,
    pub(crate) leaves: Mutex<LeaveBook>,
    pub(crate) cooldowns: Mutex<CooldownMap>,
}

impl<G: Gateway> Coordinator<G> {
    pub fn new(gateway: Arc<G>, config: BotConfig) -> Self {
        let rooms = RoomKeeper::new(Arc::clone(&gateway), config.rooms.clone());
        let search = Arc::new(SearchService::new(
            Arc::clone(&gateway),
            config.search.clone(),
        ));
        Self {
            gateway,
            config,
            rooms,
            search,
            verified: Mutex::new(VerifiedRegistry::new()),
            leaves: Mutex::new(LeaveBook::new()),
            cooldowns: Mutex::new(CooldownMap::new()),
        }
    }

    /// Audits the bot's own capabilities and warns about missing ones.
    ///
    /// Advisory only — the bot still runs, individual operations fail
    /// with permission errors as they come up.
    pub async fn startup_check(&self) {
        match self.gateway.capabilities().await {
            Ok(caps) => {
                let missing = caps.missing();
                if missing.is_empty() {
                    tracing::info!("all required capabilities granted");
                } else {
                    tracing::warn!(?missing, "bot is missing capabilities");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not audit capabilities");
            }
        }
    }

    /// Spawns the search reconciler at its configured period.
    pub fn start_reconciler(&self) -> ReconcilerHandle {
        spawn_reconciler(Arc::clone(&self.search))
    }

    /// Handles one voice presence change.
    ///
    /// The join side can provision an ephemeral room; the leave side
    /// tears down the member's search and may reap the vacated room.
    /// The platform dispatches each event on its own task, so the reap's
    /// grace wait only delays this event's processing, not the loop.
    pub async fn on_voice_update(&self, update: VoiceUpdate) {
        if let Some(joined) = update.joined() {
            match self.rooms.on_member_joined(update.member, joined).await {
                Ok(Some(room)) => {
                    tracing::debug!(member = %update.member, %room, "room provisioned");
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        member = %update.member,
                        error = %err,
                        "room provisioning failed"
                    );
                }
            }
        }

        if let Some(left) = update.left() {
            if self.search.retire_if_owner(update.member).await {
                tracing::debug!(
                    member = %update.member,
                    "search retired after owner left voice"
                );
            }
            if let Err(err) = self.rooms.on_member_left(left).await {
                tracing::warn!(channel = %left, error = %err, "room reap failed");
            }
        }
    }

    /// Handles an interactive-control activation on a search
    /// announcement.
    pub async fn on_control(
        &self,
        actor: MemberId,
        control: SearchControl,
        message: MessageId,
    ) {
        let Some(owner) = self.search.owner_of_message(message).await else {
            self.ephemeral(actor, "❌ Поиск не найден!").await;
            return;
        };

        let result = match control {
            SearchControl::Join => self.search.opt_in(owner, actor).await,
            SearchControl::Leave => self.search.opt_out(owner, actor).await,
            SearchControl::Cancel => self.search.cancel(owner, actor).await,
        };

        match result {
            Ok(()) => {}
            Err(SearchError::OwnerCannotJoin) => {
                self.ephemeral(actor, "❌ Вы не можете присоединиться к своему поиску!")
                    .await;
            }
            Err(SearchError::AlreadyJoined(_)) => {
                self.ephemeral(actor, "❌ Вы уже присоединились!").await;
            }
            Err(SearchError::NotJoined(_)) => {
                self.ephemeral(actor, "❌ Вы не присоединялись!").await;
            }
            Err(SearchError::NotOwner) => {
                self.ephemeral(actor, "❌ Только автор может завершить поиск!")
                    .await;
            }
            Err(SearchError::NoActiveSession(_)) => {
                self.ephemeral(actor, "❌ Поиск не найден!").await;
            }
            Err(err) => {
                tracing::warn!(%actor, error = %err, "search control failed");
            }
        }
    }

    // -- Role helpers ------------------------------------------------------

    /// Grants a role after checking the bot outranks it.
    pub(crate) async fn grant_role_checked(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), GatewayError> {
        self.check_hierarchy(role).await?;
        self.gateway.add_role(member, role).await
    }

    /// Revokes a role after checking the bot outranks it.
    pub(crate) async fn revoke_role_checked(
        &self,
        member: MemberId,
        role: RoleId,
    ) -> Result<(), GatewayError> {
        self.check_hierarchy(role).await?;
        self.gateway.remove_role(member, role).await
    }

    /// The bot may only mutate roles strictly below its own top role.
    async fn check_hierarchy(&self, role: RoleId) -> Result<(), GatewayError> {
        let info = self.gateway.role(role).await?;
        let top = self.gateway.top_role_position().await?;
        if info.position >= top {
            return Err(GatewayError::Permission(format!(
                "role '{}' is not below the bot's top role",
                info.name
            )));
        }
        Ok(())
    }

    pub(crate) async fn ephemeral(&self, member: MemberId, text: &str) {
        if let Err(err) = self.gateway.respond_ephemeral(member, text).await {
            tracing::warn!(%member, error = %err, "ephemeral reply failed");
        }
    }

    // -- Inspection --------------------------------------------------------

    /// The search service, for embedders that drive passes directly.
    pub fn search(&self) -> &Arc<SearchService<G>> {
        &self.search
    }

    /// The room keeper.
    pub fn rooms(&self) -> &RoomKeeper<G> {
        &self.rooms
    }

    /// Whether a member has passed verification.
    pub async fn is_verified(&self, member: MemberId) -> bool {
        self.verified.lock().await.is_verified(member)
    }

    /// The member's active leave, if any.
    pub async fn leave_record(&self, member: MemberId) -> Option<LeaveRecord> {
        self.leaves.lock().await.get(member).cloned()
    }
}

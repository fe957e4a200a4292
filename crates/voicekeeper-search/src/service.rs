//! Gateway-facing search operations: create, opt-in/out, cancel, and
//! the reconcile pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use voicekeeper_gateway::Gateway;
use voicekeeper_protocol::{colors, ChannelId, MemberId, MessageId, Payload};

use crate::{render, RenderCaps, SearchBoard, SearchError, SearchSession};

/// Configuration for the search subsystem. Fixed at construction.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Text channel the announcements are posted to.
    pub announce_channel: ChannelId,
    /// Reconciler sweep period.
    pub period: Duration,
    /// Itemized-list caps for rendered announcements.
    pub caps: RenderCaps,
}

impl SearchConfig {
    /// Default sweep period between reconcile passes.
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30);

    pub fn new(announce_channel: ChannelId) -> Self {
        Self {
            announce_channel,
            period: Self::DEFAULT_PERIOD,
            caps: RenderCaps::default(),
        }
    }
}

/// What one reconcile pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub retired: usize,
    pub refreshed: usize,
}

/// Owns the search board and performs all announcement I/O.
///
/// The board mutex is only held for registry reads and writes, never
/// across a gateway call, so command handlers and the reconciler
/// interleave safely; a session retired between two steps shows up as
/// [`SearchError::NoActiveSession`] or a skipped entry, never a panic.
pub struct SearchService<G: Gateway> {
    gateway: Arc<G>,
    config: SearchConfig,
    board: Arc<Mutex<SearchBoard>>,
}

impl<G: Gateway> SearchService<G> {
    pub fn new(gateway: Arc<G>, config: SearchConfig) -> Self {
        Self {
            gateway,
            config,
            board: Arc::new(Mutex::new(SearchBoard::new())),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Shared handle to the board, for inspection and tests.
    pub fn board(&self) -> Arc<Mutex<SearchBoard>> {
        Arc::clone(&self.board)
    }

    /// The owner whose announcement a control activation came from.
    pub async fn owner_of_message(&self, message: MessageId) -> Option<MemberId> {
        self.board.lock().await.owner_of_message(message)
    }

    /// Creates a search for `owner`, targeting their current voice
    /// channel, and posts the announcement.
    pub async fn create(
        &self,
        owner: MemberId,
        description: impl Into<String>,
    ) -> Result<MessageId, SearchError> {
        if self.board.lock().await.contains(owner) {
            return Err(SearchError::AlreadySearching(owner));
        }
        let channel = self
            .gateway
            .voice_channel_of(owner)
            .await?
            .ok_or(SearchError::NotInVoice(owner))?;

        // Post a placeholder first so the session can carry its message
        // id, then swap in the real render.
        let placeholder = Payload::new("🎯 Создание поиска...", colors::INFO)
            .description("Инициализация системы поиска игроков");
        let message = self
            .gateway
            .post(self.config.announce_channel, placeholder)
            .await?;

        let session = SearchSession::new(owner, channel, description, message);
        let info = self.resolve_channel(channel).await?;
        let payload = render(&session, info.as_ref(), &self.config.caps);
        self.gateway
            .edit(self.config.announce_channel, message, payload)
            .await?;

        self.board.lock().await.create(session)?;
        Ok(message)
    }

    /// Opts `member` into `owner`'s search and re-renders.
    pub async fn opt_in(
        &self,
        owner: MemberId,
        member: MemberId,
    ) -> Result<(), SearchError> {
        {
            let mut board = self.board.lock().await;
            let session = board
                .get_mut(owner)
                .ok_or(SearchError::NoActiveSession(owner))?;
            session.opt_in(member)?;
        }
        self.refresh(owner).await
    }

    /// Opts `member` out of `owner`'s search and re-renders.
    pub async fn opt_out(
        &self,
        owner: MemberId,
        member: MemberId,
    ) -> Result<(), SearchError> {
        {
            let mut board = self.board.lock().await;
            let session = board
                .get_mut(owner)
                .ok_or(SearchError::NoActiveSession(owner))?;
            session.opt_out(member)?;
        }
        self.refresh(owner).await
    }

    /// Cancels `owner`'s search. Only the owner may do this.
    pub async fn cancel(
        &self,
        owner: MemberId,
        actor: MemberId,
    ) -> Result<(), SearchError> {
        if actor != owner {
            return Err(SearchError::NotOwner);
        }
        let session = self
            .board
            .lock()
            .await
            .remove(owner)
            .ok_or(SearchError::NoActiveSession(owner))?;
        self.delete_announcement(&session).await;
        Ok(())
    }

    /// Retires `member`'s search because they left a voice channel.
    ///
    /// Returns `true` if a session was retired.
    pub async fn retire_if_owner(&self, member: MemberId) -> bool {
        let Some(session) = self.board.lock().await.remove(member) else {
            return false;
        };
        self.delete_announcement(&session).await;
        true
    }

    /// One reconciliation sweep over every live session.
    ///
    /// Stale sessions (channel gone, owner absent, announcement deleted)
    /// are retired; the rest get their announcement re-rendered.
    /// Transient gateway failures leave the session for the next pass.
    pub async fn reconcile_pass(&self) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        // Snapshot the owners first; holding the board lock across the
        // gateway calls below would block every command handler.
        let owners = self.board.lock().await.owners();
        for owner in owners {
            // The owner may have cancelled between enumeration and now.
            let Some(session) = self.board.lock().await.get(owner).cloned()
            else {
                continue;
            };

            let info = match self.gateway.voice_channel(session.channel).await {
                Ok(info) => Some(info),
                Err(err) if err.is_not_found() => None,
                Err(err) => {
                    tracing::warn!(
                        %owner,
                        error = %err,
                        "skipping search session this pass"
                    );
                    continue;
                }
            };

            let stale = match &info {
                None => true,
                Some(info) => !info.members.contains(&session.owner),
            };
            if stale {
                if self.retire_if_owner(owner).await {
                    summary.retired += 1;
                }
                continue;
            }

            let payload = render(&session, info.as_ref(), &self.config.caps);
            match self
                .gateway
                .edit(self.config.announce_channel, session.message, payload)
                .await
            {
                Ok(()) => summary.refreshed += 1,
                Err(err) if err.is_not_found() => {
                    // The announcement was deleted out from under us;
                    // a session with no message has nothing to keep alive.
                    if self.retire_if_owner(owner).await {
                        summary.retired += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(%owner, error = %err, "failed to refresh announcement");
                }
            }
        }

        summary
    }

    /// Re-renders one session's announcement from live channel state.
    async fn refresh(&self, owner: MemberId) -> Result<(), SearchError> {
        let Some(session) = self.board.lock().await.get(owner).cloned() else {
            return Ok(());
        };
        let info = self.resolve_channel(session.channel).await?;
        let payload = render(&session, info.as_ref(), &self.config.caps);
        match self
            .gateway
            .edit(self.config.announce_channel, session.message, payload)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => {
                self.retire_if_owner(owner).await;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn resolve_channel(
        &self,
        channel: ChannelId,
    ) -> Result<Option<voicekeeper_gateway::VoiceChannelInfo>, SearchError> {
        match self.gateway.voice_channel(channel).await {
            Ok(info) => Ok(Some(info)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_announcement(&self, session: &SearchSession) {
        match self
            .gateway
            .delete_message(self.config.announce_channel, session.message)
            .await
        {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                tracing::warn!(
                    owner = %session.owner,
                    message = %session.message,
                    error = %err,
                    "failed to delete search announcement"
                );
            }
        }
    }
}

//! The room keeper: provisions rooms on lobby entry, reaps them on vacancy.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use voicekeeper_gateway::{Gateway, GatewayError, NewVoiceChannel};
use voicekeeper_protocol::{ChannelId, MemberId};

use crate::{EphemeralRoom, RoomError, RoomRegistry, RoomsConfig, TriggerKind};

/// Owns the room registry and drives both halves of the room lifecycle.
///
/// The registry mutex is never held across a gateway call or the grace
/// sleep — every handler takes it only for its registry reads/writes, so
/// concurrent voice events serialize on short critical sections and the
/// reap race is resolved by the occupancy recheck, not by locking.
pub struct RoomKeeper<G: Gateway> {
    gateway: Arc<G>,
    config: RoomsConfig,
    registry: Arc<Mutex<RoomRegistry>>,
}

impl<G: Gateway> RoomKeeper<G> {
    pub fn new(gateway: Arc<G>, config: RoomsConfig) -> Self {
        Self {
            gateway,
            config,
            registry: Arc::new(Mutex::new(RoomRegistry::new())),
        }
    }

    /// Shared handle to the registry, for inspection and tests.
    pub fn registry(&self) -> Arc<Mutex<RoomRegistry>> {
        Arc::clone(&self.registry)
    }

    /// Handles the join side of a voice update.
    ///
    /// If the joined channel is a configured lobby, provisions a room
    /// and returns its channel id. Non-lobby joins return `Ok(None)`.
    pub async fn on_member_joined(
        &self,
        member: MemberId,
        channel: ChannelId,
    ) -> Result<Option<ChannelId>, RoomError> {
        let Some(kind) = self.config.trigger_for_lobby(channel) else {
            return Ok(None);
        };
        self.provision(member, kind).await.map(Some)
    }

    /// Handles the leave side of a voice update.
    ///
    /// If the vacated channel is a tracked room that is now empty, waits
    /// out the grace period, rechecks occupancy, and deletes the room if
    /// it is still empty. Returns `true` when the room was reaped.
    pub async fn on_member_left(
        &self,
        channel: ChannelId,
    ) -> Result<bool, RoomError> {
        if !self.registry.lock().await.contains(channel) {
            return Ok(false);
        }

        match self.occupancy(channel).await? {
            None => {
                // Deleted externally; drop the stale entry.
                self.registry.lock().await.remove(channel);
                return Ok(false);
            }
            Some(count) if count > 0 => return Ok(false),
            Some(_) => {}
        }

        tokio::time::sleep(self.config.grace).await;

        // Recheck after the grace window. Another reaper may have won the
        // race, or the room may have been re-entered; both paths no-op.
        match self.occupancy(channel).await? {
            None => {
                self.registry.lock().await.remove(channel);
                return Ok(false);
            }
            Some(count) if count > 0 => {
                tracing::debug!(%channel, "room re-occupied during grace, keeping");
                return Ok(false);
            }
            Some(_) => {}
        }

        match self.gateway.delete_channel(channel).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                // Leave the entry in place; a later vacancy retries.
                tracing::warn!(%channel, error = %err, "failed to delete empty room");
                return Ok(false);
            }
        }

        self.registry.lock().await.remove(channel);
        tracing::info!(%channel, "ephemeral room reaped");
        Ok(true)
    }

    /// Creates a room for `member` from `kind`'s template and moves the
    /// member into it.
    ///
    /// Fails without any registry mutation; the member stays in the lobby.
    async fn provision(
        &self,
        member: MemberId,
        kind: TriggerKind,
    ) -> Result<ChannelId, RoomError> {
        let template = self
            .config
            .template(kind)
            .ok_or(RoomError::MissingTemplate(kind))?;

        let category = match self
            .gateway
            .find_category(&template.category_name)
            .await?
        {
            Some(id) => id,
            None => self.gateway.create_category(&template.category_name).await?,
        };

        let ordinal = self.next_ordinal(template.base_prefix()).await?;
        let name = template.render_name(ordinal);

        let channel = self
            .gateway
            .create_voice_channel(NewVoiceChannel {
                name: name.clone(),
                user_limit: template.user_limit,
                category,
            })
            .await?;

        if let Err(err) = self.gateway.move_member(member, channel).await {
            // The room would sit unregistered forever, invisible to the
            // reaper; take it down again before reporting the failure.
            if let Err(cleanup) = self.gateway.delete_channel(channel).await {
                if !cleanup.is_not_found() {
                    tracing::warn!(
                        %channel,
                        error = %cleanup,
                        "failed to remove room after aborted provision"
                    );
                }
            }
            return Err(err.into());
        }

        self.registry.lock().await.insert(EphemeralRoom {
            channel,
            kind,
            created_by: member,
            created_at: Instant::now(),
        });
        tracing::info!(%channel, kind = %kind, %member, name = %name, "ephemeral room created");

        Ok(channel)
    }

    /// Counts sibling rooms by name prefix and returns the next ordinal.
    async fn next_ordinal(&self, prefix: &str) -> Result<usize, GatewayError> {
        let channels = self.gateway.voice_channels().await?;
        Ok(channels
            .iter()
            .filter(|info| info.name.starts_with(prefix))
            .count()
            + 1)
    }

    /// Live occupant count, or `None` if the channel no longer exists.
    async fn occupancy(
        &self,
        channel: ChannelId,
    ) -> Result<Option<usize>, GatewayError> {
        match self.gateway.voice_channel(channel).await {
            Ok(info) => Ok(Some(info.members.len())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

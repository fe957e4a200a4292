//! Top-level error type for the bot core.

use voicekeeper_gateway::GatewayError;
use voicekeeper_rooms::RoomError;
use voicekeeper_search::SearchError;

/// Errors surfaced by coordinator entry points.
///
/// Handlers resolve user-facing conditions (bad arguments, permission
/// refusals) into posted messages themselves; what propagates out of the
/// coordinator is only what the embedder should log.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// A command argument failed validation. No state was mutated.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

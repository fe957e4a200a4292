//! Error types for the room layer.

use voicekeeper_gateway::GatewayError;

use crate::TriggerKind;

/// Errors that can occur while provisioning or reaping rooms.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A lobby is configured for this trigger kind but no template is.
    #[error("no room template configured for trigger '{0}'")]
    MissingTemplate(TriggerKind),

    /// The underlying platform call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

//! Error types for the search layer.

use voicekeeper_gateway::GatewayError;
use voicekeeper_protocol::MemberId;

/// Errors that can occur during search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The member already owns an active search; one at a time.
    #[error("member {0} already has an active search")]
    AlreadySearching(MemberId),

    /// No active search exists for this owner. Also the answer for any
    /// operation that races a retirement — retired sessions are gone,
    /// not tombstoned.
    #[error("member {0} has no active search")]
    NoActiveSession(MemberId),

    /// A search can only be created from inside a voice channel.
    #[error("member {0} is not in a voice channel")]
    NotInVoice(MemberId),

    /// The owner tried to opt into their own search.
    #[error("the search owner cannot opt into their own search")]
    OwnerCannotJoin,

    /// The member has already opted in.
    #[error("member {0} already opted in")]
    AlreadyJoined(MemberId),

    /// The member never opted in.
    #[error("member {0} has not opted in")]
    NotJoined(MemberId),

    /// Only the owner may cancel a search.
    #[error("only the search owner can cancel it")]
    NotOwner,

    /// The underlying platform call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

//! The platform failure taxonomy.

/// Errors surfaced by [`Gateway`](crate::Gateway) calls.
///
/// Every handler in the core classifies failures through these three
/// variants: permission problems get surfaced to the requesting user,
/// missing entities are treated as already-satisfied wherever the entity
/// was a deletion target, and anything else is logged and abandoned.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The bot lacks the capability (or role-hierarchy position) for
    /// this mutation.
    #[error("missing permission: {0}")]
    Permission(String),

    /// A channel, role, message, or member referenced by a stale
    /// identifier no longer exists.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// The underlying platform call failed for reasons outside the
    /// bot's model. Not retried.
    #[error("platform call failed: {0}")]
    Transient(String),
}

impl GatewayError {
    /// Shorthand constructor for [`GatewayError::NotFound`].
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    /// `true` if this error means the referenced entity is gone.
    ///
    /// Deletion paths use this to tell "already done" apart from a real
    /// failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
